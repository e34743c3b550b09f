use crate::graph::Graph;
use ndarray::Array2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::warn;

/// Interior reorderings tried by `repair4`, as offsets into the window. The first entry is
/// the current order and wins ties.
const REPAIR4_ORDERS: [&[usize]; 2] = [&[1, 2], &[2, 1]];

/// Interior reorderings tried by `repair5`: (y,z,u), (y,u,z), (z,y,u), (z,u,y), (u,z,y),
/// (u,y,z) for a window x,y,z,u,v.
const REPAIR5_ORDERS: [&[usize]; 6] = [
    &[1, 2, 3],
    &[1, 3, 2],
    &[2, 1, 3],
    &[2, 3, 1],
    &[3, 2, 1],
    &[3, 1, 2],
];

fn window_cost(local: &Array2<f64>, order: &[usize]) -> f64 {
    let last = local.shape()[0] - 1;
    let mut prev = 0;
    let mut cost = 0.0;
    for &k in order.iter().chain(std::iter::once(&last)) {
        cost += local[[prev, k]];
        prev = k;
    }
    cost
}

/// Slides a window over `tour` one position at a time and rewrites the window interior with
/// the cheapest of `orders`, keeping both endpoints. Later windows see earlier rewrites.
///
/// Returns the change in open-path length, which is never positive.
fn repair_windows(graph: &Graph, tour: &mut [usize], orders: &[&[usize]]) -> f64 {
    let width = orders[0].len() + 2;
    if tour.len() < width {
        return 0.0;
    }

    let mut delta = 0.0;
    let mut window = vec![0; width];
    let mut local: Array2<f64> = Array2::zeros((width, width));

    for start in 0..=tour.len() - width {
        window.copy_from_slice(&tour[start..start + width]);
        for i in 0..width {
            for j in 0..width {
                local[[i, j]] = graph.weight(window[i], window[j]);
            }
        }

        let current = window_cost(&local, orders[0]);
        let (mut best, mut best_cost) = (0, current);
        for (i, order) in orders.iter().enumerate().skip(1) {
            let cost = window_cost(&local, order);
            if cost < best_cost {
                best = i;
                best_cost = cost;
            }
        }

        if best != 0 {
            for (slot, &k) in orders[best].iter().enumerate() {
                tour[start + 1 + slot] = window[k];
            }
            delta += best_cost - current;
        }
    }

    delta
}

/// 4-vertex window repair: swaps the two interior vertices when that shortens the window.
pub fn repair4(graph: &Graph, tour: &mut [usize]) -> f64 {
    repair_windows(graph, tour, &REPAIR4_ORDERS)
}

/// 5-vertex window repair over the six interior reorderings.
pub fn repair5(graph: &Graph, tour: &mut [usize]) -> f64 {
    repair_windows(graph, tour, &REPAIR5_ORDERS)
}

/// Draws an index with probability proportional to `scores`.
///
/// Infinite scores dominate and are drawn among uniformly. Scores are scaled by their
/// maximum before sampling so the total never overflows. Returns `None` when a score is
/// NaN or negative, or when every score is zero.
fn weighted_choice<R>(scores: &[f64], rng: &mut R) -> Option<usize>
where
    R: Rng + ?Sized,
{
    if scores.iter().any(|s| s.is_nan() || *s < 0.0) {
        return None;
    }

    let infinite: Vec<usize> = (0..scores.len())
        .filter(|&i| scores[i] == f64::INFINITY)
        .collect();
    if !infinite.is_empty() {
        return Some(infinite[rng.gen_range(0, infinite.len())]);
    }

    let max = scores.iter().cloned().fold(0.0, f64::max);
    if max <= 0.0 {
        return None;
    }

    let weights: Vec<f64> = scores.iter().map(|s| s / max).collect();
    WeightedIndex::new(&weights).ok().map(|dist| dist.sample(rng))
}

/// Panics unless `tour` visits each of `0..n` exactly once.
pub fn assert_permutation(tour: &[usize], n: usize) {
    assert_eq!(tour.len(), n, "tour has {} vertices, expected {}", tour.len(), n);
    let mut seen = vec![false; n];
    for &p in tour {
        assert!(p < n, "vertex {} out of range in tour", p);
        assert!(!seen[p], "vertex {} visited twice", p);
        seen[p] = true;
    }
}

#[derive(Debug, Clone)]
pub struct Ant {
    a: f64,
    b: f64,
    tour: Vec<usize>,
    unvisited: Vec<usize>,
    total_distance: f64,
}

impl Ant {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            a,
            b,
            tour: Vec::new(),
            unvisited: Vec::new(),
            total_distance: 0.0,
        }
    }

    pub fn tour(&self) -> &[usize] {
        &self.tour
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    fn reset(&mut self, n: usize) {
        self.tour.clear();
        self.unvisited.clear();
        self.unvisited.extend(0..n);
        self.total_distance = 0.0;
    }

    /// Draws the next vertex from `u` among the unvisited ones with probability
    /// proportional to `pheromone(u, v)^a / weight(u, v)^b`, and removes it from the
    /// unvisited set.
    ///
    /// Candidates with an infinite score win over all others. Falls back to a uniform draw
    /// when the scores are not a usable distribution.
    ///
    /// # Panics
    ///
    /// Panics if every vertex has already been visited.
    pub fn select_next<R>(&mut self, graph: &Graph, u: usize, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        assert!(!self.unvisited.is_empty(), "No cities left to visit");
        if self.unvisited.len() == 1 {
            return self.unvisited.remove(0);
        }

        let scores: Vec<f64> = self
            .unvisited
            .iter()
            .map(|&v| graph.pheromone(u, v).powf(self.a) / graph.weight(u, v).powf(self.b))
            .collect();

        let choice = match weighted_choice(&scores, rng) {
            Some(choice) => choice,
            None => {
                warn!(from = u, "degenerate selection scores, drawing uniformly");
                rng.gen_range(0, self.unvisited.len())
            }
        };

        self.unvisited.remove(choice)
    }

    /// Builds a full tour from a random start, then applies `repair5` to it.
    ///
    /// The total distance covers the open path only, the closing edge back to the start is
    /// not part of it.
    pub fn complete_tour<R>(&mut self, graph: &Graph, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let n = graph.len();
        self.reset(n);

        let start = rng.gen_range(0, n);
        self.unvisited.remove(start);
        self.tour.push(start);

        let mut u = start;
        for _ in 1..n {
            let v = self.select_next(graph, u, rng);
            self.tour.push(v);
            self.total_distance += graph.weight(u, v);
            u = v;
        }

        self.total_distance += repair5(graph, &mut self.tour);
        assert_permutation(&self.tour, n);
    }

    /// Lighter alternative to the default repair, not used by `complete_tour`.
    pub fn repair4(&mut self, graph: &Graph) {
        self.total_distance += repair4(graph, &mut self.tour);
    }

    pub fn repair5(&mut self, graph: &Graph) {
        self.total_distance += repair5(graph, &mut self.tour);
    }

    /// Adds `reward / total_distance` to both directions of every edge of the last tour.
    pub fn deposit_pheromone(&self, graph: &mut Graph, reward: f64) {
        let deposit = reward / self.total_distance;
        for edge in self.tour.windows(2) {
            graph.deposit(edge[0], edge[1], deposit);
        }
    }
}
