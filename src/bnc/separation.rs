//! Separation routines on the LP support graph.
//!
//! - [`components`]: connected components of edges with positive value.
//!   Exact for subtour cuts when the point is integral.
//! - [`min_cut_subtours`]: Stoer–Wagner global minimum cut. Every
//!   cut-of-the-phase lighter than 2 is a violated subtour inequality.
//! - [`combs`]: blossom heuristic. Components of the fractional subgraph
//!   act as handles, edges at 1 leaving the handle act as teeth.
//!
//! # References
//!
//! - Stoer, M. & Wagner, F. (1997). "A simple min-cut algorithm",
//!   *Journal of the ACM* 44(4), 585-591.
//! - Padberg, M. & Rinaldi, G. (1990). "Facet identification for the
//!   symmetric traveling salesman polytope", *Mathematical Programming* 47.

use super::cut::{Cut, SupportEdge};
use crate::graph::union_find::UnionFind;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

/// Support values at or below this are treated as zero.
const ZERO: f64 = 1e-9;

/// Connected components of `{e : x_e > 0}` on nodes `0..n`.
pub(crate) fn components(n: usize, support: &[SupportEdge]) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(n);
    for &(u, v, x) in support {
        if x > ZERO {
            uf.union(u, v);
        }
    }
    uf.groups()
}

/// Subtour cuts for a disconnected support graph, one per component.
pub(crate) fn component_cuts(n: usize, support: &[SupportEdge]) -> Vec<Cut> {
    let comps = components(n, support);
    if comps.len() <= 1 {
        return Vec::new();
    }
    comps.iter().map(|c| Cut::subtour(c, n)).collect()
}

#[derive(PartialEq)]
struct Key(f64, usize);

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .total_cmp(&other.0)
            .then_with(|| other.1.cmp(&self.1))
    }
}

/// Stoer–Wagner on the support graph. Returns the global minimum cut
/// weight together with every cut-of-the-phase of weight below
/// `2 - eps` as a subtour cut. Assumes a connected support graph.
pub(crate) fn min_cut_subtours(n: usize, support: &[SupportEdge], eps: f64) -> (f64, Vec<Cut>) {
    let mut adj: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
    for &(u, v, x) in support {
        if x > ZERO {
            *adj[u].entry(v).or_insert(0.0) += x;
            *adj[v].entry(u).or_insert(0.0) += x;
        }
    }
    let mut members: Vec<Vec<usize>> = (0..n).map(|v| vec![v]).collect();
    let mut alive: Vec<usize> = (0..n).collect();
    let mut best = f64::INFINITY;
    let mut cuts = Vec::new();

    while alive.len() > 1 {
        // Maximum adjacency ordering with a lazy heap.
        let mut weight = vec![0.0; n];
        let mut added = vec![false; n];
        let mut heap = BinaryHeap::new();
        let start = alive[0];
        heap.push(Key(0.0, start));
        let mut order = Vec::with_capacity(alive.len());
        while order.len() < alive.len() {
            let v = match heap.pop() {
                Some(Key(w, v)) => {
                    if added[v] || w < weight[v] {
                        continue;
                    }
                    v
                }
                // Disconnected remainder: continue from any unvisited node.
                None => match alive.iter().copied().find(|&v| !added[v]) {
                    Some(v) => v,
                    None => break,
                },
            };
            added[v] = true;
            order.push(v);
            for (&w, &x) in &adj[v] {
                if !added[w] {
                    weight[w] += x;
                    heap.push(Key(weight[w], w));
                }
            }
        }

        let t = order[order.len() - 1];
        let s = order[order.len() - 2];
        let phase_cut = weight[t];
        if phase_cut < best {
            best = phase_cut;
        }
        if phase_cut < 2.0 - eps {
            cuts.push(Cut::subtour(&members[t], n));
        }

        // Merge t into s.
        let t_adj = std::mem::take(&mut adj[t]);
        for (w, x) in t_adj {
            adj[w].remove(&t);
            if w == s {
                continue;
            }
            *adj[s].entry(w).or_insert(0.0) += x;
            *adj[w].entry(s).or_insert(0.0) += x;
        }
        let moved = std::mem::take(&mut members[t]);
        members[s].extend(moved);
        alive.retain(|&v| v != t);
    }
    (best, cuts)
}

/// Blossom heuristic for comb inequalities.
///
/// Each connected component `H` of the fractional edges (`eps < x < 1-eps`)
/// is a handle candidate. The edges at 1 with exactly one end in `H` are
/// the teeth; with an odd count of at least three pairwise disjoint teeth
/// the comb `x(δ(H)) + Σ x(δ(T_i)) ≥ 3k + 1` is checked for violation.
pub(crate) fn combs(n: usize, support: &[SupportEdge], eps: f64) -> Vec<Cut> {
    let mut uf = UnionFind::new(n);
    let mut has_fractional = vec![false; n];
    for &(u, v, x) in support {
        if x > eps && x < 1.0 - eps {
            uf.union(u, v);
            has_fractional[u] = true;
            has_fractional[v] = true;
        }
    }

    let mut found = Vec::new();
    for handle in uf.groups() {
        if handle.len() < 3 || !has_fractional[handle[0]] {
            continue;
        }
        let mut in_handle = vec![false; n];
        for &v in &handle {
            in_handle[v] = true;
        }

        let mut teeth: Vec<Vec<usize>> = Vec::new();
        let mut used = vec![false; n];
        let mut disjoint = true;
        let mut boundary = 0.0;
        for &(u, v, x) in support {
            if in_handle[u] == in_handle[v] {
                continue;
            }
            boundary += x;
            if x >= 1.0 - eps {
                if used[u] || used[v] {
                    disjoint = false;
                    break;
                }
                used[u] = true;
                used[v] = true;
                teeth.push(vec![u, v]);
            }
        }
        let k = teeth.len();
        if !disjoint || k < 3 || k % 2 == 0 {
            continue;
        }
        // With degree rows tight each tooth contributes 2, so a boundary of
        // k + 1 or more cannot be violated.
        if boundary >= (k + 1) as f64 - eps {
            continue;
        }
        let cut = Cut::comb(&handle, &teeth, n);
        if cut.violation(support) > eps {
            found.push(cut);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> Vec<SupportEdge> {
        vec![
            (0, 1, 1.0),
            (1, 2, 1.0),
            (0, 2, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
            (3, 5, 1.0),
        ]
    }

    /// Fractional point of two triangles {0,1,2} and {3,4,5} joined by
    /// three edges at 1: triangle edges at 1/2. Violates the comb with
    /// handle {0,1,2} but no subtour inequality.
    fn prism() -> Vec<SupportEdge> {
        vec![
            (0, 1, 0.5),
            (1, 2, 0.5),
            (0, 2, 0.5),
            (3, 4, 0.5),
            (4, 5, 0.5),
            (3, 5, 0.5),
            (0, 3, 1.0),
            (1, 4, 1.0),
            (2, 5, 1.0),
        ]
    }

    #[test]
    fn test_components() {
        let comps = components(6, &two_triangles());
        assert_eq!(comps, vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert_eq!(component_cuts(6, &two_triangles()).len(), 2);
    }

    #[test]
    fn test_connected_support_has_no_component_cuts() {
        assert!(component_cuts(6, &prism()).is_empty());
    }

    #[test]
    fn test_min_cut_on_hamiltonian_cycle() {
        let cycle: Vec<SupportEdge> = (0..6).map(|i| (i, (i + 1) % 6, 1.0)).collect();
        let (weight, cuts) = min_cut_subtours(6, &cycle, 1e-6);
        assert!((weight - 2.0).abs() < 1e-9);
        assert!(cuts.is_empty());
    }

    #[test]
    fn test_min_cut_finds_weak_bridge() {
        // Two triangles joined by two edges at 0.25.
        let mut support = vec![
            (0, 1, 0.875),
            (1, 2, 1.0),
            (0, 2, 0.875),
            (3, 4, 0.875),
            (4, 5, 1.0),
            (3, 5, 0.875),
        ];
        support.push((0, 3, 0.25));
        support.push((2, 5, 0.25));
        let (weight, cuts) = min_cut_subtours(6, &support, 1e-6);
        assert!((weight - 0.5).abs() < 1e-9);
        assert!(cuts
            .iter()
            .any(|c| c.sets()[0] == vec![3, 4, 5] && c.violation(&support) > 1.0));
    }

    #[test]
    fn test_prism_comb() {
        let support = prism();
        let (weight, _) = min_cut_subtours(6, &support, 1e-6);
        assert!(weight >= 2.0 - 1e-9);
        let cuts = combs(6, &support, 1e-6);
        // Both handles describe the same comb once normalized.
        assert_eq!(cuts.len(), 2);
        assert_eq!(cuts[0].sets(), cuts[1].sets());
        for cut in &cuts {
            assert_eq!(cut.rhs, 10.0);
            assert!((cut.violation(&support) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_integral_point_has_no_combs() {
        assert!(combs(6, &two_triangles(), 1e-6).is_empty());
    }
}
