use crate::error::{AcoError, AcoResult};
use ndarray::Array2;

/// Added to every off-diagonal distance so coincident points never score with a
/// zero denominator.
pub const DISTANCE_EPSILON: f64 = 1e-6;

/// A point of the instance, `index` is the identifier used by the input file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub index: i64,
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(index: i64, x: f64, y: f64) -> Self {
        Self { index, x, y }
    }

    pub fn distance(&self, other: &Vertex) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

fn init_pheromone_matrix(n: usize) -> Array2<f64> {
    Array2::from_elem((n, n), 1.0)
}

fn compute_weight_matrix(vertices: &[Vertex]) -> Array2<f64> {
    let n = vertices.len();
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            0.0
        } else {
            vertices[i].distance(&vertices[j]) + DISTANCE_EPSILON
        }
    })
}

/// Complete graph over a fixed vertex set.
///
/// Matrices are indexed by position in `vertices`, not by `Vertex::index`. Weights are
/// fixed at construction; pheromones start at 1.0 and are kept symmetric and strictly
/// positive by `evaporate` and `deposit`.
#[derive(Debug, Clone)]
pub struct Graph {
    vertices: Vec<Vertex>,
    weights: Array2<f64>,
    pheromones: Array2<f64>,
}

impl Graph {
    pub fn new(vertices: Vec<Vertex>) -> AcoResult<Self> {
        if vertices.len() < 2 {
            return Err(AcoError::Construction {
                vertices: vertices.len(),
            });
        }

        let weights = compute_weight_matrix(&vertices);
        let pheromones = init_pheromone_matrix(vertices.len());

        Ok(Self {
            vertices,
            weights,
            pheromones,
        })
    }

    /// Builds a graph from bare coordinates, numbering vertices from 1.
    pub fn from_coords(coords: &[(f64, f64)]) -> AcoResult<Self> {
        let vertices = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Vertex::new(i as i64 + 1, x, y))
            .collect();

        Self::new(vertices)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn weight(&self, u: usize, v: usize) -> f64 {
        self.weights[[u, v]]
    }

    pub fn pheromone(&self, u: usize, v: usize) -> f64 {
        self.pheromones[[u, v]]
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn pheromones(&self) -> &Array2<f64> {
        &self.pheromones
    }

    /// Multiplies every trail by `factor`, never letting one reach zero.
    pub fn evaporate(&mut self, factor: f64) {
        self.pheromones
            .mapv_inplace(|tau| (tau * factor).max(f64::MIN_POSITIVE));
    }

    /// Adds `amount` to the trail of edge `u <-> v` in both directions.
    pub fn deposit(&mut self, u: usize, v: usize, amount: f64) {
        self.pheromones[[u, v]] += amount;
        if u != v {
            self.pheromones[[v, u]] += amount;
        }
    }

    /// Length of `tour` as an open path, the closing edge back to the start is not counted.
    pub fn path_length(&self, tour: &[usize]) -> f64 {
        tour.windows(2)
            .fold(0.0, |acc, edge| acc + self.weights[[edge[0], edge[1]]])
    }

    /// Length of `tour` as a cycle, including the closing edge.
    pub fn closed_tour_length(&self, tour: &[usize]) -> f64 {
        match (tour.first(), tour.last()) {
            (Some(&first), Some(&last)) if tour.len() > 1 => {
                self.path_length(tour) + self.weights[[last, first]]
            }
            _ => 0.0,
        }
    }

    /// Maps external indices back to positions. The result must name every vertex once.
    pub fn positions_of(&self, tour: &[i64]) -> AcoResult<Vec<usize>> {
        let mut seen = vec![false; self.vertices.len()];
        let mut positions = Vec::with_capacity(tour.len());

        for &index in tour {
            let position = self
                .vertices
                .iter()
                .position(|v| v.index == index)
                .ok_or_else(|| AcoError::InvalidTour(format!("unknown vertex {}", index)))?;
            if seen[position] {
                return Err(AcoError::InvalidTour(format!("vertex {} repeated", index)));
            }
            seen[position] = true;
            positions.push(position);
        }

        if positions.len() != self.vertices.len() {
            return Err(AcoError::InvalidTour(format!(
                "{} of {} vertices visited",
                positions.len(),
                self.vertices.len()
            )));
        }

        Ok(positions)
    }

    /// Maps vertex positions to the external indices of the input.
    pub fn external_indices(&self, tour: &[usize]) -> Vec<i64> {
        tour.iter().map(|&p| self.vertices[p].index).collect()
    }
}
