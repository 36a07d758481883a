//! Lin-Kernighan local search (chained LK).
//!
//! Builds a greedy tour, improves it with variable-depth exchange chains,
//! and escapes local optima with double-bridge kicks. The best tour seen
//! is returned, never the last one.
//!
//! Instances need not be complete graphs. Pairs that are not instance
//! edges are priced at a penalty larger than any feasible tour, so the
//! result is feasible whenever the search reaches a Hamiltonian cycle of
//! the instance; [`LkResult::feasible`] reports which case occurred.
//!
//! # References
//!
//! - Lin, S. & Kernighan, B. W. (1973). "An effective heuristic algorithm
//!   for the traveling-salesman problem", *Operations Research* 21(2), 498-516.
//! - Applegate, Bixby, Chvátal & Cook (2006), *The Traveling Salesman
//!   Problem: A Computational Study*, chapter 15.

mod array;
mod config;
pub(crate) mod construct;
mod kick;
pub(crate) mod penalty;
mod runner;
mod types;

pub use config::LkConfig;
pub use runner::{LkResult, LkRunner};
pub use types::{KickType, LkStopReason};
