//! One-call entry points.
//!
//! Each function validates the input, runs an engine with settings derived
//! from [`SolveOptions`] and returns a report. Malformed input fails
//! before any search; an instance without a tour still yields a report
//! with `feasible == false`.
//!
//! # Examples
//!
//! ```
//! use u_tsp::api::{solve_exact, SolveOptions};
//! use u_tsp::report::SolveStatus;
//!
//! let edges = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
//! let costs = [1, 3, 4, 5, 2, 6];
//! let report = solve_exact(4, &edges, &costs, &SolveOptions::default()).unwrap();
//! assert_eq!(report.status, SolveStatus::Optimal);
//! assert_eq!(report.cost, Some(12));
//! ```

use crate::bnc::{BncConfig, BncRunner};
use crate::error::Result;
use crate::graph::{Cost, Instance, Tour};
use crate::lk::{LkConfig, LkRunner};
use crate::logging::progress;
use crate::report::{ExactReport, HeuristicReport};
use std::time::Duration;

/// Caller-facing settings shared by all entry points.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Warm-start tour; must be a permutation of all nodes.
    pub start_tour: Option<Vec<usize>>,

    /// Wall-clock budget.
    pub time_limit: Option<Duration>,

    /// Stop once a tour costs at most this much.
    pub target: Option<Cost>,

    /// Progress at info level instead of debug. Never changes results.
    pub verbose: bool,

    /// Random seed (None for default seed).
    pub seed: Option<u64>,
}

impl SolveOptions {
    pub fn with_start_tour(mut self, tour: Vec<usize>) -> Self {
        self.start_tour = Some(tour);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_target(mut self, target: Cost) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn start(&self, node_count: usize) -> Result<Option<Tour>> {
        self.start_tour
            .as_ref()
            .map(|order| Tour::new(order.clone(), node_count))
            .transpose()
    }

    fn lk_config(&self) -> LkConfig {
        let mut config = LkConfig::default().with_verbose(self.verbose);
        config.time_limit = self.time_limit;
        config.target = self.target;
        config.seed = self.seed;
        config
    }

    fn bnc_config(&self) -> BncConfig {
        let mut config = BncConfig::default()
            .with_verbose(self.verbose)
            .with_heuristic(LkConfig::default().with_verbose(self.verbose));
        config.time_limit = self.time_limit;
        config.target = self.target;
        config.seed = self.seed;
        config
    }
}

fn exact(instance: &Instance, options: &SolveOptions) -> Result<ExactReport> {
    let start = options.start(instance.node_count())?;
    progress!(
        options.verbose,
        "solve_exact: nodes={} edges={} warm_start={}",
        instance.node_count(),
        instance.edge_count(),
        start.is_some()
    );
    let result = BncRunner::run(instance, &options.bnc_config(), start.as_ref())?;
    Ok(ExactReport::from_result(&result, options.target))
}

fn heuristic(instance: &Instance, options: &SolveOptions) -> Result<HeuristicReport> {
    let start = options.start(instance.node_count())?;
    progress!(
        options.verbose,
        "solve_heuristic: nodes={} edges={} warm_start={}",
        instance.node_count(),
        instance.edge_count(),
        start.is_some()
    );
    let result = LkRunner::run(instance, &options.lk_config(), start.as_ref())?;
    Ok(HeuristicReport::from_result(&result))
}

/// Exact solve over an edge list.
pub fn solve_exact(
    node_count: usize,
    edges: &[(usize, usize)],
    costs: &[Cost],
    options: &SolveOptions,
) -> Result<ExactReport> {
    exact(&Instance::new(node_count, edges, costs)?, options)
}

/// Lin-Kernighan solve over an edge list.
pub fn solve_heuristic(
    node_count: usize,
    edges: &[(usize, usize)],
    costs: &[Cost],
    options: &SolveOptions,
) -> Result<HeuristicReport> {
    heuristic(&Instance::new(node_count, edges, costs)?, options)
}

/// Exact solve over the upper triangle of a square cost matrix.
pub fn solve_exact_dense(matrix: &[Vec<Cost>], options: &SolveOptions) -> Result<ExactReport> {
    exact(&Instance::from_dense(matrix)?, options)
}

/// Lin-Kernighan solve over the upper triangle of a square cost matrix.
pub fn solve_heuristic_dense(
    matrix: &[Vec<Cost>],
    options: &SolveOptions,
) -> Result<HeuristicReport> {
    heuristic(&Instance::from_dense(matrix)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TspError;
    use crate::report::SolveStatus;

    const EDGES: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
    const COSTS: [Cost; 6] = [1, 3, 4, 5, 2, 6];

    #[test]
    fn test_exact_four_nodes() {
        let report = solve_exact(4, &EDGES, &COSTS, &SolveOptions::default()).unwrap();
        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(report.cost, Some(12));
        assert!(report.feasible);
    }

    #[test]
    fn test_heuristic_four_nodes() {
        let report = solve_heuristic(4, &EDGES, &COSTS, &SolveOptions::default()).unwrap();
        assert_eq!(report.cost, 12);
        assert!(report.feasible);
    }

    #[test]
    fn test_dense_matches_edge_list() {
        let matrix = vec![
            vec![0, 1, 3, 4],
            vec![1, 0, 5, 2],
            vec![3, 5, 0, 6],
            vec![4, 2, 6, 0],
        ];
        let options = SolveOptions::default().with_seed(3);
        let dense = solve_exact_dense(&matrix, &options).unwrap();
        let listed = solve_exact(4, &EDGES, &COSTS, &options).unwrap();
        assert_eq!(dense.cost, listed.cost);
        assert_eq!(solve_heuristic_dense(&matrix, &options).unwrap().cost, 12);
    }

    #[test]
    fn test_bad_start_tour_is_rejected() {
        let options = SolveOptions::default().with_start_tour(vec![0, 1, 1, 2]);
        assert!(matches!(
            solve_exact(4, &EDGES, &COSTS, &options),
            Err(TspError::InvalidInstance(_))
        ));
        assert!(solve_heuristic(4, &EDGES, &COSTS, &options).is_err());
    }

    #[test]
    fn test_invalid_instance_fails_before_search() {
        let err = solve_exact(3, &[(0, 0)], &[1], &SolveOptions::default()).unwrap_err();
        assert!(matches!(err, TspError::InvalidInstance(_)));
        let err = solve_heuristic(3, &[(0, 1)], &[-1], &SolveOptions::default()).unwrap_err();
        assert!(matches!(err, TspError::InvalidInstance(_)));
    }

    #[test]
    fn test_verbose_does_not_change_result() {
        let quiet = solve_exact(4, &EDGES, &COSTS, &SolveOptions::default()).unwrap();
        let loud = solve_exact(4, &EDGES, &COSTS, &SolveOptions::default().with_verbose(true)).unwrap();
        assert_eq!(quiet, loud);
    }
}
