//! Travelling salesman solver core.
//!
//! Two cooperating engines over a weighted, possibly sparse graph:
//!
//! - **Branch-and-cut** ([`bnc`]): exact search that proves optimality or
//!   reports the best tour and bound found within its limits. LP relaxation
//!   over every edge with subtour and comb cuts, best-bound branching.
//! - **Lin-Kernighan** ([`lk`]): chained LK local search with
//!   double-bridge kicks. Produces good tours fast and warm-starts the
//!   exact engine.
//!
//! [`api`] wraps both behind edge-list and dense-matrix entry points that
//! return [`report`] types with a status code and a feasibility flag.
//!
//! # Logging
//!
//! Progress goes through the [`log`] facade. The crate never installs a
//! logger.
//!
//! # Features
//!
//! - `parallel`: branch-and-cut workers on rayon (`BncConfig::num_workers`).
//! - `serde`: serialization for tours, reports and status types.

pub mod api;
pub mod bnc;
pub mod error;
pub mod graph;
pub mod lk;
mod logging;
pub mod report;

pub use api::{solve_exact, solve_exact_dense, solve_heuristic, solve_heuristic_dense, SolveOptions};
pub use error::{Result, TspError};
pub use report::{ExactReport, HeuristicReport, Reporter, SolveStatus};
