//! Cyclic tours over an [`Instance`].

use super::instance::{Cost, Instance};
use crate::error::{Result, TspError};

/// A cyclic permutation of all nodes of an instance.
///
/// Construction only checks that `order` is a permutation of `0..n`; whether
/// every consecutive pair is an instance edge is answered by
/// [`Tour::is_feasible`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    order: Vec<usize>,
}

impl Tour {
    /// Validates that `order` visits each of `0..node_count` exactly once.
    pub fn new(order: Vec<usize>, node_count: usize) -> Result<Self> {
        if order.len() != node_count {
            return Err(TspError::invalid_instance(format!(
                "tour has {} nodes, expected {node_count}",
                order.len()
            )));
        }
        let mut seen = vec![false; node_count];
        for &v in &order {
            if v >= node_count {
                return Err(TspError::invalid_instance(format!(
                    "tour visits node {v} outside 0..{node_count}"
                )));
            }
            if std::mem::replace(&mut seen[v], true) {
                return Err(TspError::invalid_instance(format!(
                    "tour visits node {v} twice"
                )));
            }
        }
        Ok(Self { order })
    }

    /// Wraps an order that the caller already knows is a permutation.
    pub(crate) fn from_permutation(order: Vec<usize>) -> Self {
        debug_assert!({
            let mut sorted = order.clone();
            sorted.sort_unstable();
            sorted.iter().enumerate().all(|(i, &v)| i == v)
        });
        Self { order }
    }

    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    #[inline]
    pub fn into_order(self) -> Vec<usize> {
        self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The `n` traversed node pairs, including the wraparound pair.
    ///
    /// A two-node tour yields `(a, b)` and `(b, a)`: the single edge is
    /// walked in both directions.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.order.len();
        (0..n).map(move |i| (self.order[i], self.order[(i + 1) % n]))
    }

    /// Total cost, or `None` if the tour uses a pair that is not an edge.
    pub fn cost(&self, instance: &Instance) -> Option<Cost> {
        self.edges()
            .map(|(u, v)| instance.cost_of(u, v).ok())
            .sum()
    }

    pub fn is_feasible(&self, instance: &Instance) -> bool {
        self.order.len() == instance.node_count()
            && self
                .edges()
                .all(|(u, v)| instance.edge_between(u, v).is_some())
    }

    /// Rotation starting at node 0, oriented so that the second node is the
    /// smaller of node 0's two tour neighbours. Equal cycles give equal
    /// canonical forms.
    pub fn canonical(&self) -> Vec<usize> {
        let n = self.order.len();
        if n == 0 {
            return Vec::new();
        }
        let start = self.order.iter().position(|&v| v == 0).unwrap_or(0);
        let forward: Vec<usize> = (0..n).map(|i| self.order[(start + i) % n]).collect();
        if n > 2 && forward[n - 1] < forward[1] {
            let mut reversed = Vec::with_capacity(n);
            reversed.push(forward[0]);
            reversed.extend(forward[1..].iter().rev());
            reversed
        } else {
            forward
        }
    }
}
