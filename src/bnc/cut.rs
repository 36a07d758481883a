//! Hypergraph cuts and the shared cut pool.
//!
//! Every cut has the form `Σ_S x(δ(S)) ≥ rhs` over a family of node sets.
//! A subtour inequality is the single-set case `x(δ(S)) ≥ 2`; a comb with
//! handle `H` and `k` teeth is `x(δ(H)) + Σ x(δ(T_i)) ≥ 3k + 1`.

use std::collections::HashMap;
use std::sync::Arc;

pub(crate) type CutId = usize;

/// Support graph entry: edge endpoints and LP value.
pub(crate) type SupportEdge = (usize, usize, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CutKind {
    Subtour,
    Comb,
}

#[derive(Debug, Clone)]
pub(crate) struct Cut {
    pub(crate) kind: CutKind,
    pub(crate) rhs: f64,
    /// Normalized sets: sorted, never containing node 0, in sorted order.
    sets: Vec<Vec<usize>>,
    member: Vec<Vec<bool>>,
}

/// `δ(S) = δ(V \ S)`, so keep the side without node 0.
fn normalize(set: &[usize], n: usize) -> Vec<usize> {
    let mut inside = vec![false; n];
    for &v in set {
        inside[v] = true;
    }
    let flip = inside[0];
    (0..n).filter(|&v| inside[v] != flip).collect()
}

impl Cut {
    fn from_sets(kind: CutKind, mut sets: Vec<Vec<usize>>, rhs: f64, n: usize) -> Self {
        sets.sort();
        let member = sets
            .iter()
            .map(|s| {
                let mut m = vec![false; n];
                for &v in s {
                    m[v] = true;
                }
                m
            })
            .collect();
        Self {
            kind,
            rhs,
            sets,
            member,
        }
    }

    /// `x(δ(S)) ≥ 2`.
    pub(crate) fn subtour(set: &[usize], n: usize) -> Self {
        Self::from_sets(CutKind::Subtour, vec![normalize(set, n)], 2.0, n)
    }

    /// `x(δ(H)) + Σ x(δ(T_i)) ≥ 3k + 1` for `k` teeth.
    pub(crate) fn comb(handle: &[usize], teeth: &[Vec<usize>], n: usize) -> Self {
        let mut sets = Vec::with_capacity(teeth.len() + 1);
        sets.push(normalize(handle, n));
        sets.extend(teeth.iter().map(|t| normalize(t, n)));
        let rhs = (3 * teeth.len() + 1) as f64;
        Self::from_sets(CutKind::Comb, sets, rhs, n)
    }

    /// Number of sets whose boundary edge `(u, v)` crosses.
    #[inline]
    pub(crate) fn coefficient(&self, u: usize, v: usize) -> f64 {
        self.member.iter().filter(|m| m[u] != m[v]).count() as f64
    }

    pub(crate) fn activity(&self, support: &[SupportEdge]) -> f64 {
        support
            .iter()
            .map(|&(u, v, x)| x * self.coefficient(u, v))
            .sum()
    }

    /// `rhs - activity`; positive means violated.
    pub(crate) fn violation(&self, support: &[SupportEdge]) -> f64 {
        self.rhs - self.activity(support)
    }

    pub(crate) fn sets(&self) -> &[Vec<usize>] {
        &self.sets
    }
}

/// Globally valid cuts, deduplicated by their normalized sets.
#[derive(Debug, Default)]
pub(crate) struct CutPool {
    cuts: Vec<Arc<Cut>>,
    index: HashMap<Vec<Vec<usize>>, CutId>,
}

impl CutPool {
    /// Adds `cut` unless an identical cut is pooled; returns its id.
    pub(crate) fn insert(&mut self, cut: Cut) -> CutId {
        if let Some(&id) = self.index.get(cut.sets()) {
            return id;
        }
        let id = self.cuts.len();
        self.index.insert(cut.sets().to_vec(), id);
        self.cuts.push(Arc::new(cut));
        id
    }

    pub(crate) fn get(&self, id: CutId) -> Arc<Cut> {
        Arc::clone(&self.cuts[id])
    }

    pub(crate) fn len(&self) -> usize {
        self.cuts.len()
    }

    /// Pooled cuts outside `active` violated by more than `eps`, most
    /// violated first, at most `limit` of them.
    pub(crate) fn violated(
        &self,
        support: &[SupportEdge],
        active: &[CutId],
        eps: f64,
        limit: usize,
    ) -> Vec<CutId> {
        let mut found: Vec<(f64, CutId)> = self
            .cuts
            .iter()
            .enumerate()
            .filter(|(id, _)| !active.contains(id))
            .filter_map(|(id, cut)| {
                let viol = cut.violation(support);
                (viol > eps).then_some((viol, id))
            })
            .collect();
        found.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        found.into_iter().take(limit).map(|(_, id)| id).collect()
    }
}
