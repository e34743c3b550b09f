//! Ant colony optimization for the euclidean travelling salesman problem.
//!
//! ```no_run
//! use aco_tsp::{AntProps, AntSystem, Graph};
//!
//! let graph = Graph::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])?;
//! let mut system = AntSystem::new(graph, &AntProps::default())?;
//! let solution = system.run();
//! println!("{:?} {}", solution.tour, solution.distance);
//! # Ok::<(), aco_tsp::AcoError>(())
//! ```

pub mod ant;
pub mod error;
pub mod graph;
pub mod system;
pub mod tsp;
pub mod utils;

pub use crate::ant::Ant;
pub use crate::error::{AcoError, AcoResult};
pub use crate::graph::{Graph, Vertex};
pub use crate::system::{AntProps, AntSystem, Snapshot, Solution};
