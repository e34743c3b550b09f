use ndarray::Array2;
use prettytable::format::consts::FORMAT_BOX_CHARS;
use prettytable::{Cell, Row, Table};

pub trait ToDisplayPath {
    fn to_display_path(&self) -> String;
}

impl<T: ToString> ToDisplayPath for [T] {
    fn to_display_path(&self) -> String {
        self.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Renders `matrix` as a box-drawn table with `precision` decimals per entry.
pub fn pretty_matrix(matrix: &Array2<f64>, precision: usize) -> String {
    let mut table = Table::new();
    table.set_format(*FORMAT_BOX_CHARS);

    for row in matrix.outer_iter() {
        let cells = row
            .iter()
            .map(|value| Cell::new(&format!("{:.*}", precision, value)))
            .collect();
        table.add_row(Row::new(cells));
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_path_joins_with_arrows() {
        assert_eq!([4, 1, 7][..].to_display_path(), "4 -> 1 -> 7");
        assert_eq!(Vec::<i64>::new().to_display_path(), "");
    }

    #[test]
    fn pretty_matrix_shows_every_entry() {
        let matrix = Array2::from_shape_vec((2, 2), vec![1.0, 0.25, 0.25, 1.0]).unwrap();
        let rendered = pretty_matrix(&matrix, 2);
        assert_eq!(rendered.matches("1.00").count(), 2);
        assert_eq!(rendered.matches("0.25").count(), 2);
    }
}
