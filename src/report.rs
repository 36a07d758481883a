//! Result reporting.
//!
//! Turns engine results into the public contract: a tour, its cost, a
//! [`SolveStatus`] and a feasibility flag. Reports are always produced for
//! a finished call, including calls that found no tour.

use crate::bnc::{BncResult, BncStopReason};
use crate::error::{Result, TspError};
use crate::graph::Cost;
use crate::lk::LkResult;

/// Status of an exact solve, with stable numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveStatus {
    /// A tour was found and proven optimal.
    Optimal,
    /// The time limit stopped the search.
    TimeLimit,
    /// A tour at or below the target cost was found.
    TargetReached,
    /// Anything else: no tour, node limit, cancellation.
    Unknown,
}

impl SolveStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Optimal => 0,
            Self::TimeLimit => 1,
            Self::TargetReached => 2,
            Self::Unknown => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Optimal),
            1 => Some(Self::TimeLimit),
            2 => Some(Self::TargetReached),
            3 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Maps an exact run to a status. Checked in order: optimal tour,
    /// time limit, tour within `target`, unknown.
    pub fn from_exact(result: &BncResult, target: Option<Cost>) -> Self {
        let found = result.feasible;
        if found && result.reason == BncStopReason::Optimal {
            Self::Optimal
        } else if result.reason == BncStopReason::TimeLimit {
            Self::TimeLimit
        } else if found
            && target
                .zip(result.cost)
                .is_some_and(|(target, cost)| cost <= target)
        {
            Self::TargetReached
        } else {
            Self::Unknown
        }
    }
}

/// Whether a call produced a feasible tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReturnCode {
    Ok,
    Failure,
}

impl ReturnCode {
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Failure => 1,
        }
    }
}

/// Outcome of an exact solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExactReport {
    /// Node order of the best tour; empty if no tour was found.
    pub tour: Vec<usize>,
    /// Cost of `tour`.
    pub cost: Option<Cost>,
    pub status: SolveStatus,
    /// True iff `tour` is a Hamiltonian cycle of the instance.
    pub feasible: bool,
    /// Best proven lower bound, if any.
    pub lower_bound: Option<f64>,
}

impl ExactReport {
    pub fn from_result(result: &BncResult, target: Option<Cost>) -> Self {
        Self {
            tour: result
                .tour
                .as_ref()
                .map(|t| t.order().to_vec())
                .unwrap_or_default(),
            cost: result.cost,
            status: SolveStatus::from_exact(result, target),
            feasible: result.feasible,
            lower_bound: result.lower_bound,
        }
    }

    pub fn return_code(&self) -> ReturnCode {
        if self.feasible {
            ReturnCode::Ok
        } else {
            ReturnCode::Failure
        }
    }
}

/// Outcome of a heuristic solve.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeuristicReport {
    /// Node order of the best tour. Always a permutation of all nodes.
    pub tour: Vec<usize>,
    /// Tour cost; missing edges count at the penalty price when
    /// `feasible` is false.
    pub cost: Cost,
    pub feasible: bool,
}

impl HeuristicReport {
    pub fn from_result(result: &LkResult) -> Self {
        Self {
            tour: result.tour.order().to_vec(),
            cost: result.cost,
            feasible: result.feasible,
        }
    }

    pub fn return_code(&self) -> ReturnCode {
        if self.feasible {
            ReturnCode::Ok
        } else {
            ReturnCode::Failure
        }
    }
}

/// Keeps the last report of each kind.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    exact: Option<ExactReport>,
    heuristic: Option<HeuristicReport>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_exact(&mut self, result: &BncResult, target: Option<Cost>) -> &ExactReport {
        self.exact.insert(ExactReport::from_result(result, target))
    }

    pub fn record_heuristic(&mut self, result: &LkResult) -> &HeuristicReport {
        self.heuristic.insert(HeuristicReport::from_result(result))
    }

    /// Last exact report. Fails with [`TspError::NotRun`] if no exact
    /// solve was recorded.
    pub fn exact(&self) -> Result<&ExactReport> {
        self.exact.as_ref().ok_or(TspError::NotRun)
    }

    /// Last heuristic report. Fails with [`TspError::NotRun`] if no
    /// heuristic solve was recorded.
    pub fn heuristic(&self) -> Result<&HeuristicReport> {
        self.heuristic.as_ref().ok_or(TspError::NotRun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnc::BncStats;
    use crate::graph::Tour;

    fn result(reason: BncStopReason, cost: Option<Cost>) -> BncResult {
        BncResult {
            tour: cost.map(|_| Tour::new(vec![0, 1, 2, 3], 4).unwrap()),
            cost,
            lower_bound: cost.map(|c| c as f64),
            reason,
            feasible: cost.is_some(),
            stats: BncStats::default(),
        }
    }

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            SolveStatus::Optimal,
            SolveStatus::TimeLimit,
            SolveStatus::TargetReached,
            SolveStatus::Unknown,
        ] {
            assert_eq!(SolveStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(SolveStatus::from_code(7), None);
    }

    #[test]
    fn test_status_mapping() {
        let optimal = result(BncStopReason::Optimal, Some(10));
        assert_eq!(SolveStatus::from_exact(&optimal, Some(20)), SolveStatus::Optimal);

        let timed_out = result(BncStopReason::TimeLimit, Some(10));
        assert_eq!(SolveStatus::from_exact(&timed_out, Some(20)), SolveStatus::TimeLimit);
        let timed_out_empty = result(BncStopReason::TimeLimit, None);
        assert_eq!(SolveStatus::from_exact(&timed_out_empty, None), SolveStatus::TimeLimit);

        let target = result(BncStopReason::TargetReached, Some(10));
        assert_eq!(SolveStatus::from_exact(&target, Some(10)), SolveStatus::TargetReached);

        let limited = result(BncStopReason::NodeLimit, Some(10));
        assert_eq!(SolveStatus::from_exact(&limited, None), SolveStatus::Unknown);
        assert_eq!(SolveStatus::from_exact(&limited, Some(15)), SolveStatus::TargetReached);

        let infeasible = result(BncStopReason::Infeasible, None);
        assert_eq!(SolveStatus::from_exact(&infeasible, Some(15)), SolveStatus::Unknown);
    }

    #[test]
    fn test_exact_report_without_tour() {
        let report = ExactReport::from_result(&result(BncStopReason::Infeasible, None), None);
        assert!(report.tour.is_empty());
        assert!(!report.feasible);
        assert_eq!(report.return_code(), ReturnCode::Failure);
        assert_eq!(report.return_code().code(), 1);
    }

    #[test]
    fn test_reporter_not_run() {
        let mut reporter = Reporter::new();
        assert_eq!(reporter.exact(), Err(TspError::NotRun));
        assert_eq!(reporter.heuristic().err(), Some(TspError::NotRun));
        reporter.record_exact(&result(BncStopReason::Optimal, Some(4)), None);
        let report = reporter.exact().unwrap();
        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(report.tour, vec![0, 1, 2, 3]);
        assert_eq!(report.return_code(), ReturnCode::Ok);
    }
}
