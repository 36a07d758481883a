//! Exact branch-and-cut search.
//!
//! The relaxation is the subtour formulation over the instance edges:
//! degree equations plus subtour and comb inequalities found by
//! separation. Each search node solves its LP over a priced core of
//! edges, cuts until no violated inequality remains, then either prunes
//! against the incumbent, installs an integral tour, or branches on an
//! edge. A tour is proven optimal when the work list empties.
//!
//! The LP solver is a bounded dense simplex written for this crate, so
//! exact search is practical up to a few hundred nodes.

mod config;
mod cut;
mod incumbent;
mod lp;
mod relaxation;
mod runner;
mod separation;
mod tree;
mod types;

pub use config::BncConfig;
pub use runner::{BncResult, BncRunner};
pub use types::{BncStats, BncStopReason, NodeSelection};
