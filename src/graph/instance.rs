//! Weighted undirected graph over which tours are built.

use crate::error::{Result, TspError};
use std::collections::HashMap;

/// Edge weight. Costs are non-negative integers.
pub type Cost = i64;

/// Index of an edge in the order it was supplied to [`Instance::new`].
pub type EdgeId = usize;

/// An undirected edge, stored with `u < v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
    pub cost: Cost,
}

impl Edge {
    /// Returns the endpoint opposite to `w`.
    #[inline]
    pub fn other(&self, w: usize) -> usize {
        if self.u == w {
            self.v
        } else {
            self.u
        }
    }
}

#[inline]
fn key(u: usize, v: usize) -> (usize, usize) {
    if u < v {
        (u, v)
    } else {
        (v, u)
    }
}

/// A validated TSP instance: node count, edge list and edge costs.
///
/// The instance is immutable once built. Cost lookups go through a hash map
/// keyed by the normalized node pair, and every node keeps its incident edges
/// sorted by ascending cost.
///
/// # Examples
///
/// ```
/// use u_tsp::graph::Instance;
///
/// let inst = Instance::new(3, &[(0, 1), (1, 2), (0, 2)], &[4, 5, 6]).unwrap();
/// assert_eq!(inst.cost_of(2, 1).unwrap(), 5);
/// assert!(inst.cost_of(0, 0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    node_count: usize,
    edges: Vec<Edge>,
    lookup: HashMap<(usize, usize), EdgeId>,
    adjacency: Vec<Vec<(usize, EdgeId)>>,
    max_cost: Cost,
}

impl Instance {
    /// Builds an instance from a sparse edge list.
    ///
    /// Fails with [`TspError::InvalidInstance`] if there are fewer than two
    /// nodes, if `edges` and `costs` differ in length, or if an edge is a
    /// self-loop, a duplicate, out of range or has a negative cost.
    pub fn new(node_count: usize, edges: &[(usize, usize)], costs: &[Cost]) -> Result<Self> {
        if node_count < 2 {
            return Err(TspError::invalid_instance(format!(
                "node count must be at least 2, got {node_count}"
            )));
        }
        if edges.len() != costs.len() {
            return Err(TspError::invalid_instance(format!(
                "{} edges but {} costs",
                edges.len(),
                costs.len()
            )));
        }

        let mut stored = Vec::with_capacity(edges.len());
        let mut lookup = HashMap::with_capacity(edges.len());
        let mut adjacency: Vec<Vec<(usize, EdgeId)>> = vec![Vec::new(); node_count];
        let mut max_cost = 0;

        for (id, (&(a, b), &cost)) in edges.iter().zip(costs).enumerate() {
            if a >= node_count || b >= node_count {
                return Err(TspError::invalid_instance(format!(
                    "edge {id} = ({a}, {b}) has a node outside 0..{node_count}"
                )));
            }
            if a == b {
                return Err(TspError::invalid_instance(format!(
                    "edge {id} is a self-loop on node {a}"
                )));
            }
            if cost < 0 {
                return Err(TspError::invalid_instance(format!(
                    "edge {id} = ({a}, {b}) has negative cost {cost}"
                )));
            }
            let (u, v) = key(a, b);
            if let Some(prev) = lookup.insert((u, v), id) {
                return Err(TspError::invalid_instance(format!(
                    "edge {id} = ({a}, {b}) duplicates edge {prev}"
                )));
            }
            stored.push(Edge { u, v, cost });
            adjacency[u].push((v, id));
            adjacency[v].push((u, id));
            max_cost = max_cost.max(cost);
        }

        for list in &mut adjacency {
            list.sort_by_key(|&(w, id)| (stored[id].cost, w));
        }

        Ok(Self {
            node_count,
            edges: stored,
            lookup,
            adjacency,
            max_cost,
        })
    }

    /// Builds the complete graph from the upper triangle of a square matrix.
    ///
    /// `matrix[i][j]` with `i < j` is the cost of edge `(i, j)`. The diagonal
    /// and the lower triangle are never read.
    pub fn from_dense(matrix: &[Vec<Cost>]) -> Result<Self> {
        let n = matrix.len();
        for (i, row) in matrix.iter().enumerate() {
            if row.len() < n {
                return Err(TspError::invalid_instance(format!(
                    "row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
        }

        let m = n * n.saturating_sub(1) / 2;
        let mut edges = Vec::with_capacity(m);
        let mut costs = Vec::with_capacity(m);
        for (i, row) in matrix.iter().enumerate() {
            for (j, &c) in row.iter().enumerate().take(n).skip(i + 1) {
                edges.push((i, j));
                costs.push(c);
            }
        }
        Self::new(n, &edges, &costs)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Looks up the edge joining `u` and `v`, in either orientation.
    #[inline]
    pub fn edge_between(&self, u: usize, v: usize) -> Option<EdgeId> {
        self.lookup.get(&key(u, v)).copied()
    }

    /// Cost of the edge joining `u` and `v`.
    pub fn cost_of(&self, u: usize, v: usize) -> Result<Cost> {
        self.edge_between(u, v)
            .map(|id| self.edges[id].cost)
            .ok_or(TspError::InvalidEdge { u, v })
    }

    /// Incident edges of `v` as `(neighbor, edge)` pairs, cheapest first.
    #[inline]
    pub fn neighbors(&self, v: usize) -> &[(usize, EdgeId)] {
        &self.adjacency[v]
    }

    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    /// Largest edge cost (0 for an edgeless graph).
    #[inline]
    pub fn max_cost(&self) -> Cost {
        self.max_cost
    }

    /// Whether the instance contains every edge of the complete graph.
    pub fn is_complete(&self) -> bool {
        self.edges.len() == self.node_count * (self.node_count - 1) / 2
    }

    /// Whether some node has fewer than two incident edges, which rules
    /// out every tour (for `n = 2` a single edge is enough).
    pub fn has_degree_deficit(&self) -> bool {
        let needed = if self.node_count == 2 { 1 } else { 2 };
        self.adjacency.iter().any(|list| list.len() < needed)
    }
}
