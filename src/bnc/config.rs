//! Branch-and-cut configuration.

use super::types::NodeSelection;
use crate::graph::Cost;
use crate::lk::LkConfig;
use std::time::Duration;

/// Configuration parameters for the branch-and-cut engine.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_tsp::bnc::{BncConfig, NodeSelection};
///
/// let config = BncConfig::default()
///     .with_time_limit(Duration::from_secs(5))
///     .with_node_selection(NodeSelection::DepthFirst)
///     .with_max_cut_rounds(20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BncConfig {
    /// Wall-clock budget for the whole run, warm-start heuristic included.
    pub time_limit: Option<Duration>,

    /// Stop as soon as the incumbent costs at most this much.
    pub target: Option<Cost>,

    /// Random seed for the embedded heuristic (None for default seed).
    pub seed: Option<u64>,

    /// Open node exploration order.
    pub node_selection: NodeSelection,

    /// Maximum number of search nodes to process.
    pub max_nodes: Option<usize>,

    /// Separation rounds per node before branching.
    pub max_cut_rounds: usize,

    /// Rounds a cut may stay slack before it leaves a node's LP.
    pub cut_age_limit: usize,

    /// Run LK before the search to seed the incumbent.
    pub initial_heuristic: bool,

    /// Share of the time limit the warm-start LK may use.
    pub heuristic_share: f64,

    /// Settings of the warm-start and embedded LK runs.
    pub heuristic: LkConfig,

    /// Distance from 0 or 1 still treated as integral.
    pub integrality_tol: f64,

    /// Cold rebuilds of a node's LP after the solver reports an internal
    /// failure. Once spent, the node is branched on without a bound.
    pub lp_retries: usize,

    /// Worker loops sharing the work list. Values above 1 need the
    /// `parallel` feature.
    pub num_workers: usize,

    /// Emit progress at info level instead of debug.
    pub verbose: bool,
}

impl Default for BncConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            target: None,
            seed: None,
            node_selection: NodeSelection::default(),
            max_nodes: None,
            max_cut_rounds: 50,
            cut_age_limit: 5,
            initial_heuristic: true,
            heuristic_share: 0.5,
            heuristic: LkConfig::default(),
            integrality_tol: 1e-6,
            lp_retries: 2,
            num_workers: 1,
            verbose: false,
        }
    }
}

impl BncConfig {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_target(mut self, target: Cost) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_node_selection(mut self, selection: NodeSelection) -> Self {
        self.node_selection = selection;
        self
    }

    pub fn with_max_nodes(mut self, n: usize) -> Self {
        self.max_nodes = Some(n);
        self
    }

    pub fn with_max_cut_rounds(mut self, n: usize) -> Self {
        self.max_cut_rounds = n;
        self
    }

    pub fn with_cut_age_limit(mut self, n: usize) -> Self {
        self.cut_age_limit = n;
        self
    }

    pub fn with_initial_heuristic(mut self, on: bool) -> Self {
        self.initial_heuristic = on;
        self
    }

    pub fn with_heuristic(mut self, heuristic: LkConfig) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_lp_retries(mut self, n: usize) -> Self {
        self.lp_retries = n;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_workers == 0 {
            return Err("num_workers must be positive".into());
        }
        if self.num_workers > 1 && !cfg!(feature = "parallel") {
            return Err("num_workers > 1 requires the `parallel` feature".into());
        }
        if self.cut_age_limit == 0 {
            return Err("cut_age_limit must be positive".into());
        }
        if !(self.integrality_tol > 0.0 && self.integrality_tol < 0.5) {
            return Err("integrality_tol must be in (0, 0.5)".into());
        }
        if !(self.heuristic_share > 0.0 && self.heuristic_share <= 1.0) {
            return Err("heuristic_share must be in (0, 1]".into());
        }
        if self.max_nodes == Some(0) {
            return Err("max_nodes must be positive".into());
        }
        self.heuristic.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BncConfig::default();
        assert_eq!(config.node_selection, NodeSelection::BestBound);
        assert_eq!(config.num_workers, 1);
        assert!(config.initial_heuristic);
        assert!((config.integrality_tol - 1e-6).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = BncConfig::default()
            .with_target(10)
            .with_max_nodes(3)
            .with_seed(5)
            .with_initial_heuristic(false)
            .with_lp_retries(0);
        assert_eq!(config.target, Some(10));
        assert_eq!(config.lp_retries, 0);
        assert_eq!(config.max_nodes, Some(3));
        assert_eq!(config.seed, Some(5));
        assert!(!config.initial_heuristic);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(BncConfig::default().with_num_workers(0).validate().is_err());
        assert!(BncConfig::default().with_cut_age_limit(0).validate().is_err());
        assert!(BncConfig::default().with_max_nodes(0).validate().is_err());
        let mut config = BncConfig::default();
        config.integrality_tol = 0.7;
        assert!(config.validate().is_err());
        let bad_lk = LkConfig::default().with_breadth(0);
        assert!(BncConfig::default().with_heuristic(bad_lk).validate().is_err());
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn test_workers_need_parallel_feature() {
        assert!(BncConfig::default().with_num_workers(4).validate().is_err());
    }
}
