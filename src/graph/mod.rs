//! Graph/distance model.
//!
//! - [`Instance`]: node count, validated edge list, O(1) cost lookup
//! - [`Tour`]: cyclic permutation with cost and feasibility queries

mod instance;
mod tour;
pub(crate) mod union_find;

pub use instance::{Cost, Edge, EdgeId, Instance};
pub use tour::Tour;
