//! Cost oracle that prices missing edges with a large penalty.

use crate::error::{Result, TspError};
use crate::graph::{Cost, Instance};

/// Edge costs over the complete graph on the instance's nodes.
///
/// Pairs that are not instance edges cost `(max_cost + 1) * n`, which is
/// more than any feasible tour. A penalized-optimal tour is therefore
/// feasible whenever a feasible tour exists.
pub(crate) struct PenalizedCosts<'a> {
    instance: &'a Instance,
    penalty: Cost,
}

impl<'a> PenalizedCosts<'a> {
    pub(crate) fn new(instance: &'a Instance) -> Result<Self> {
        let n = instance.node_count() as Cost;
        let penalty = instance
            .max_cost()
            .checked_add(1)
            .and_then(|c| c.checked_mul(n))
            // A tour made only of penalty edges must still fit.
            .filter(|p| p.checked_mul(n).is_some())
            .ok_or_else(|| {
                TspError::resource_exhaustion(format!(
                    "edge costs up to {} overflow tour arithmetic for {} nodes",
                    instance.max_cost(),
                    n
                ))
            })?;
        Ok(Self { instance, penalty })
    }

    #[inline]
    pub(crate) fn instance(&self) -> &'a Instance {
        self.instance
    }

    #[inline]
    pub(crate) fn cost(&self, u: usize, v: usize) -> Cost {
        match self.instance.edge_between(u, v) {
            Some(id) => self.instance.edge(id).cost,
            None => self.penalty,
        }
    }

    pub(crate) fn tour_cost(&self, order: &[usize]) -> Cost {
        let n = order.len();
        (0..n).map(|i| self.cost(order[i], order[(i + 1) % n])).sum()
    }
}
