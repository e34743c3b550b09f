use thiserror::Error;

pub type AcoResult<T> = Result<T, AcoError>;

#[derive(Debug, Error)]
pub enum AcoError {
    /// A tour needs at least two vertices.
    #[error("cannot build a graph from {vertices} vertices, at least 2 are required")]
    Construction { vertices: usize },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("invalid tour: {0}")]
    InvalidTour(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {cause}")]
    Parse { line: usize, cause: String },
}

impl AcoError {
    pub(crate) fn invalid<V: ToString>(name: &'static str, value: V, reason: &'static str) -> Self {
        AcoError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
