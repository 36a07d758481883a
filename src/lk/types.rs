//! Kick family and stop reasons for the Lin-Kernighan engine.

/// How the four cut points of a double-bridge kick are chosen.
///
/// # References
///
/// Applegate, Cook & Rohe (2003), "Chained Lin-Kernighan for large
/// traveling salesman problems", *INFORMS Journal on Computing* 15(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KickType {
    /// Four uniformly random tour positions.
    #[default]
    Random,
    /// Positions of a random node and of nodes among its candidate
    /// neighbours (and theirs), so the bridge reconnects a local region.
    Close,
    /// Positions of nodes visited by a short random walk over candidate
    /// edges starting from a random node.
    Walk,
}

/// Why an LK run stopped. Every variant is a successful termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LkStopReason {
    /// `stall_count` consecutive kicks did not improve the best tour.
    Stalled,
    /// The kick budget was used up.
    KickLimit,
    /// The time limit elapsed.
    TimeLimit,
    /// The best tour reached the target cost.
    TargetReached,
    /// The cancellation token was set.
    Cancelled,
    /// The instance has a single cyclic tour (three nodes or fewer).
    Trivial,
}
