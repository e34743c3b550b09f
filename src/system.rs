use crate::ant::Ant;
use crate::error::{AcoError, AcoResult};
use crate::graph::Graph;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};

const INITIAL_GOAL_FACTOR: f64 = 0.5;
const GOAL_FACTOR_SPAN: f64 = 0.4;

/// Colony hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AntProps {
    /// Number of ants.
    pub colony_size: usize,
    /// Pheromone exponent.
    pub a: f64,
    /// Distance exponent.
    pub b: f64,
    /// Fraction of every trail lost per round, in (0, 1).
    pub evaporation_rate: f64,
    pub iterations: usize,
    /// Seed for the colony's generator, entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for AntProps {
    fn default() -> Self {
        Self {
            colony_size: 50,
            a: 1.0,
            b: 3.0,
            evaporation_rate: 0.2,
            iterations: 100,
            seed: None,
        }
    }
}

impl AntProps {
    pub fn validate(&self) -> AcoResult<()> {
        if self.colony_size == 0 {
            return Err(AcoError::invalid("colony_size", self.colony_size, "must be positive"));
        }
        if self.iterations == 0 {
            return Err(AcoError::invalid("iterations", self.iterations, "must be positive"));
        }
        if !self.a.is_finite() {
            return Err(AcoError::invalid("a", self.a, "must be finite"));
        }
        if !self.b.is_finite() {
            return Err(AcoError::invalid("b", self.b, "must be finite"));
        }
        if !(self.evaporation_rate > 0.0 && self.evaporation_rate < 1.0) {
            return Err(AcoError::invalid(
                "evaporation_rate",
                self.evaporation_rate,
                "must lie strictly between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// Best tour known after a round, in external vertex indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Number of completed rounds.
    pub round: usize,
    pub best_tour: Vec<i64>,
    pub best_distance: f64,
    /// Whether the last round improved the best tour.
    pub improved: bool,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Best tour in external vertex indices.
    pub tour: Vec<i64>,
    /// Best tour as positions into the graph.
    pub positions: Vec<usize>,
    /// Open-path length of the best tour.
    pub distance: f64,
    /// Best distance after each round.
    pub history: Vec<f64>,
}

/// The colony: a fixed set of ants sharing one graph.
///
/// Each round every ant builds and repairs a tour against the current trails, then all
/// trails evaporate, then every ant deposits on its own tour. Deposits never start before
/// every ant of the round has finished building.
#[derive(Debug, Clone)]
pub struct AntSystem {
    graph: Graph,
    ants: Vec<Ant>,
    rng: StdRng,

    evaporation_rate: f64,
    iterations: usize,
    round: usize,
    goal_factor: f64,
    goal_increment: f64,

    best_tour: Vec<usize>,
    best_distance: f64,
    history: Vec<f64>,
}

impl AntSystem {
    pub fn new(graph: Graph, props: &AntProps) -> AcoResult<Self> {
        props.validate()?;

        let rng = match props.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ants = (0..props.colony_size)
            .map(|_| Ant::new(props.a, props.b))
            .collect();

        Ok(Self {
            graph,
            ants,
            rng,
            evaporation_rate: props.evaporation_rate,
            iterations: props.iterations,
            round: 0,
            goal_factor: INITIAL_GOAL_FACTOR,
            goal_increment: GOAL_FACTOR_SPAN / props.iterations as f64,
            best_tour: Vec::new(),
            best_distance: f64::INFINITY,
            history: Vec::with_capacity(props.iterations),
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Goal factor the next deposit will use.
    pub fn goal_factor(&self) -> f64 {
        self.goal_factor
    }

    pub fn is_finished(&self) -> bool {
        self.round >= self.iterations
    }

    /// Best tour so far as graph positions, empty before the first round.
    pub fn best_tour(&self) -> &[usize] {
        &self.best_tour
    }

    /// Best open-path length so far, infinite before the first round.
    pub fn best_distance(&self) -> f64 {
        self.best_distance
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Open-path length of `tour`, the closing edge is not counted.
    pub fn tour_distance(&self, tour: &[usize]) -> f64 {
        self.graph.path_length(tour)
    }

    pub fn snapshot(&self) -> Snapshot {
        let improved = match self.history.len() {
            0 => false,
            1 => true,
            n => self.history[n - 1] < self.history[n - 2],
        };

        Snapshot {
            round: self.round,
            best_tour: self.graph.external_indices(&self.best_tour),
            best_distance: self.best_distance,
            improved,
        }
    }

    /// Runs one round. Returns `None` once the iteration budget is spent.
    pub fn step(&mut self) -> Option<Snapshot> {
        if self.is_finished() {
            return None;
        }

        let graph = &self.graph;
        for (id, ant) in self.ants.iter_mut().enumerate() {
            ant.complete_tour(graph, &mut self.rng);
            trace!(round = self.round, ant = id, distance = ant.total_distance());

            if ant.total_distance() < self.best_distance {
                self.best_distance = ant.total_distance();
                self.best_tour.clear();
                self.best_tour.extend_from_slice(ant.tour());
                debug!(
                    round = self.round,
                    ant = id,
                    distance = self.best_distance,
                    "new best tour"
                );
            }
        }

        self.graph.evaporate(1.0 - self.evaporation_rate);

        let reward = self.best_distance * self.goal_factor;
        for ant in &self.ants {
            ant.deposit_pheromone(&mut self.graph, reward);
        }

        debug!(
            round = self.round,
            goal_factor = self.goal_factor,
            best = self.best_distance,
            "round finished"
        );

        self.goal_factor += self.goal_increment;
        self.round += 1;
        self.history.push(self.best_distance);

        Some(self.snapshot())
    }

    /// Runs every remaining round.
    pub fn run(&mut self) -> Solution {
        while self.step().is_some() {}
        self.solution()
    }

    pub fn solution(&self) -> Solution {
        Solution {
            tour: self.graph.external_indices(&self.best_tour),
            positions: self.best_tour.clone(),
            distance: self.best_distance,
            history: self.history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ant::assert_permutation;
    use crate::graph::Vertex;

    fn props(colony_size: usize, iterations: usize, seed: u64) -> AntProps {
        AntProps {
            colony_size,
            iterations,
            seed: Some(seed),
            ..AntProps::default()
        }
    }

    fn scattered(n: usize) -> Graph {
        let coords: Vec<_> = (0..n)
            .map(|i| {
                let i = i as f64;
                ((i * 37.0) % 23.0, (i * 11.0) % 17.0 + i * 0.1)
            })
            .collect();
        Graph::from_coords(&coords).unwrap()
    }

    #[test]
    fn default_props_are_valid() {
        assert!(AntProps::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_props() {
        let bad = [
            AntProps { colony_size: 0, ..AntProps::default() },
            AntProps { iterations: 0, ..AntProps::default() },
            AntProps { evaporation_rate: 0.0, ..AntProps::default() },
            AntProps { evaporation_rate: 1.0, ..AntProps::default() },
            AntProps { evaporation_rate: f64::NAN, ..AntProps::default() },
            AntProps { a: f64::INFINITY, ..AntProps::default() },
            AntProps { b: f64::NAN, ..AntProps::default() },
        ];
        for props in &bad {
            let graph = scattered(4);
            assert!(matches!(
                AntSystem::new(graph, props),
                Err(AcoError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn step_stops_after_budget() {
        let mut system = AntSystem::new(scattered(6), &props(3, 4, 1)).unwrap();
        for round in 1..=4 {
            let snapshot = system.step().unwrap();
            assert_eq!(snapshot.round, round);
        }
        assert!(system.is_finished());
        assert!(system.step().is_none());
        assert_eq!(system.history().len(), 4);
    }

    #[test]
    fn accessors_track_progress() {
        let mut system = AntSystem::new(scattered(9), &props(3, 5, 12)).unwrap();
        assert_eq!(system.ants().len(), 3);
        assert_eq!(system.iterations(), 5);
        assert_eq!(system.round(), 0);
        assert!(system.best_tour().is_empty());
        assert_eq!(system.best_distance(), f64::INFINITY);
        assert!(!system.snapshot().improved);

        let first = system.step().unwrap();
        assert!(first.improved);
        assert_eq!(system.round(), 1);
        assert_permutation(system.best_tour(), 9);
        assert_eq!(system.best_distance(), first.best_distance);
        assert!(system
            .ants()
            .iter()
            .all(|ant| ant.total_distance() >= system.best_distance()));

        let mut previous = first.best_distance;
        while let Some(snapshot) = system.step() {
            assert_eq!(snapshot.improved, snapshot.best_distance < previous);
            previous = snapshot.best_distance;
        }
        assert_eq!(system.round(), system.iterations());
    }

    #[test]
    fn goal_factor_grows_linearly() {
        let mut system = AntSystem::new(scattered(6), &props(2, 10, 2)).unwrap();
        assert!((system.goal_factor() - 0.5).abs() < 1e-12);
        system.step();
        assert!((system.goal_factor() - 0.54).abs() < 1e-12);
        system.run();
        assert!((system.goal_factor() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn best_distance_never_increases() {
        let mut system = AntSystem::new(scattered(20), &props(5, 30, 3)).unwrap();
        let solution = system.run();
        for pair in solution.history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert_eq!(solution.distance, *solution.history.last().unwrap());
    }

    #[test]
    fn best_tour_is_valid_and_matches_distance() {
        let mut system = AntSystem::new(scattered(15), &props(8, 20, 4)).unwrap();
        let solution = system.run();
        assert_permutation(&solution.positions, 15);
        let recomputed = system.tour_distance(&solution.positions);
        assert!((recomputed - solution.distance).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_run() {
        let first = AntSystem::new(scattered(12), &props(4, 15, 5)).unwrap().run();
        let second = AntSystem::new(scattered(12), &props(4, 15, 5)).unwrap().run();
        assert_eq!(first, second);
    }

    #[test]
    fn evaporation_precedes_deposit() {
        let graph = Graph::from_coords(&[(0.0, 0.0), (1.0, 0.0)]).unwrap();
        let props = AntProps {
            colony_size: 1,
            iterations: 1,
            evaporation_rate: 0.5,
            seed: Some(6),
            ..AntProps::default()
        };
        let mut system = AntSystem::new(graph, &props).unwrap();
        system.step();

        // The only tour is the best one, so the deposit is exactly the goal factor.
        let trails = system.graph().pheromones();
        assert!((trails[[0, 1]] - 1.0).abs() < 1e-12);
        assert!((trails[[1, 0]] - 1.0).abs() < 1e-12);
        assert!((trails[[0, 0]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn snapshot_uses_external_indices() {
        let graph = Graph::new(vec![
            Vertex::new(101, 0.0, 0.0),
            Vertex::new(102, 5.0, 0.0),
            Vertex::new(103, 5.0, 5.0),
        ])
        .unwrap();
        let mut system = AntSystem::new(graph, &props(2, 3, 7)).unwrap();
        let snapshot = system.step().unwrap();
        let mut seen = snapshot.best_tour.clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![101, 102, 103]);
        assert!(snapshot.best_distance.is_finite());
    }

    #[test]
    fn unit_square_converges() {
        let graph = Graph::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
        let mut system = AntSystem::new(graph, &props(5, 200, 8)).unwrap();
        let solution = system.run();

        // Reported distance leaves out the closing edge; the cycle is the perimeter.
        assert!((solution.distance - 3.0).abs() < 1e-3);
        let closed = system.graph().closed_tour_length(&solution.positions);
        assert!((closed - 4.0).abs() < 1e-3);
    }

    #[test]
    fn collinear_points_converge() {
        let graph = Graph::from_coords(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]).unwrap();
        let mut system = AntSystem::new(graph, &props(5, 200, 9)).unwrap();
        let solution = system.run();

        assert!((solution.distance - 2.0).abs() < 1e-3);
        let closed = system.graph().closed_tour_length(&solution.positions);
        assert!((closed - 4.0).abs() < 1e-3);
        assert!(system
            .graph()
            .pheromones()
            .iter()
            .all(|tau| tau.is_finite() && *tau > 0.0));
    }
}
