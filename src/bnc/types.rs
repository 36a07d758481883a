//! Node selection, stop reasons and statistics for branch-and-cut.

/// Order in which open search nodes are explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeSelection {
    /// Smallest LP bound first; deeper nodes break ties.
    #[default]
    BestBound,
    /// Deepest node first; smaller bound breaks ties.
    DepthFirst,
}

/// Why a branch-and-cut run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BncStopReason {
    /// The work list emptied with an incumbent: the tour is optimal.
    Optimal,
    /// The work list emptied without any tour: no Hamiltonian cycle exists.
    Infeasible,
    /// The time limit elapsed.
    TimeLimit,
    /// The incumbent reached the target cost.
    TargetReached,
    /// `max_nodes` search nodes were processed.
    NodeLimit,
    /// The cancellation token was set.
    Cancelled,
}

impl BncStopReason {
    /// Whether the search proved its answer (optimality or infeasibility).
    pub fn is_proof(&self) -> bool {
        matches!(self, Self::Optimal | Self::Infeasible)
    }
}

/// Counters collected over one run (summed across workers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BncStats {
    /// Search nodes whose relaxation was solved.
    pub nodes_explored: usize,

    /// Nodes discarded by bound or infeasibility.
    pub nodes_pruned: usize,

    /// LP solves, retries included.
    pub lp_solves: usize,

    /// Cuts added to node relaxations.
    pub cuts_added: usize,

    /// LP solves that failed inside the solver and were retried or
    /// given up on.
    pub lp_failures: usize,

    /// Deepest node explored.
    pub max_depth: usize,
}

impl BncStats {
    #[cfg(any(test, feature = "parallel"))]
    pub(crate) fn merge(&mut self, other: &BncStats) {
        self.nodes_explored += other.nodes_explored;
        self.nodes_pruned += other.nodes_pruned;
        self.lp_solves += other.lp_solves;
        self.cuts_added += other.cuts_added;
        self.lp_failures += other.lp_failures;
        self.max_depth = self.max_depth.max(other.max_depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sums_and_maxes() {
        let mut a = BncStats {
            nodes_explored: 3,
            max_depth: 4,
            ..Default::default()
        };
        let b = BncStats {
            nodes_explored: 2,
            lp_solves: 7,
            lp_failures: 1,
            max_depth: 2,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.nodes_explored, 5);
        assert_eq!(a.lp_solves, 7);
        assert_eq!(a.lp_failures, 1);
        assert_eq!(a.max_depth, 4);
    }

    #[test]
    fn test_proof_reasons() {
        assert!(BncStopReason::Optimal.is_proof());
        assert!(BncStopReason::Infeasible.is_proof());
        assert!(!BncStopReason::TimeLimit.is_proof());
        assert!(!BncStopReason::NodeLimit.is_proof());
    }
}
