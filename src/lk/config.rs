//! Lin-Kernighan configuration.

use super::types::KickType;
use crate::graph::Cost;
use std::time::Duration;

/// Configuration parameters for the Lin-Kernighan engine.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_tsp::lk::{KickType, LkConfig};
///
/// let config = LkConfig::default()
///     .with_stall_count(50)
///     .with_kick(KickType::Walk)
///     .with_time_limit(Duration::from_millis(200))
///     .with_seed(7);
/// assert_eq!(config.stall_count, 50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct LkConfig {
    /// Consecutive kicks without improvement before stopping.
    pub stall_count: usize,

    /// Total kick budget. `None` means one kick per node.
    pub max_kicks: Option<usize>,

    /// Wall-clock budget for the whole run.
    pub time_limit: Option<Duration>,

    /// Stop as soon as the best tour costs at most this much.
    pub target: Option<Cost>,

    /// Kick family used to escape local optima.
    pub kick: KickType,

    /// Maximum number of exchanges in one LK chain.
    pub max_depth: usize,

    /// Alternatives tried for the first exchange of a chain.
    pub breadth: usize,

    /// Candidate neighbours kept per node.
    pub candidates: usize,

    /// Random seed (None for default seed).
    pub seed: Option<u64>,

    /// Emit progress at info level instead of debug.
    pub verbose: bool,
}

impl Default for LkConfig {
    fn default() -> Self {
        Self {
            stall_count: 100_000_000,
            max_kicks: None,
            time_limit: None,
            target: None,
            kick: KickType::default(),
            max_depth: 50,
            breadth: 5,
            candidates: 10,
            seed: None,
            verbose: false,
        }
    }
}

impl LkConfig {
    pub fn with_stall_count(mut self, n: usize) -> Self {
        self.stall_count = n;
        self
    }

    pub fn with_max_kicks(mut self, n: usize) -> Self {
        self.max_kicks = Some(n);
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

    pub fn with_kick(mut self, kick: KickType) -> Self {
        self.kick = kick;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_breadth(mut self, breadth: usize) -> Self {
        self.breadth = breadth;
        self
    }

    pub fn with_candidates(mut self, k: usize) -> Self {
        self.candidates = k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.stall_count == 0 {
            return Err("stall_count must be positive".into());
        }
        if self.max_depth == 0 {
            return Err("max_depth must be positive".into());
        }
        if self.breadth == 0 {
            return Err("breadth must be positive".into());
        }
        if self.candidates == 0 {
            return Err("candidates must be positive".into());
        }
        Ok(())
    }
}
