//! Double-bridge kicks.
//!
//! A double bridge cuts the tour into four segments `A B C D` and
//! reconnects them as `A C B D`. It cannot be undone by a single
//! sequential LK chain, which makes it a good escape move.
//!
//! # Reference
//!
//! Martin, Otto & Felten (1991), "Large-step Markov chains for the
//! traveling salesman problem", *Complex Systems* 5(3), 299-326.

use super::types::KickType;
use rand::seq::index::sample;
use rand::Rng;

const WALK_STEPS: usize = 50;

/// Outcome of a kick: the new order and the eight nodes whose tour
/// neighbours changed.
pub(crate) struct Kicked {
    pub(crate) order: Vec<usize>,
    pub(crate) touched: [usize; 8],
}

/// Applies a double bridge to `order`. Requires `order.len() >= 4`.
pub(crate) fn double_bridge<R: Rng>(
    order: &[usize],
    kick: KickType,
    candidates: &[Vec<usize>],
    rng: &mut R,
) -> Kicked {
    let n = order.len();
    debug_assert!(n >= 4);

    let mut cuts = match kick {
        KickType::Random => None,
        KickType::Close => close_cuts(order, candidates, rng),
        KickType::Walk => walk_cuts(order, candidates, rng),
    }
    .unwrap_or_else(|| random_cuts(n, rng));
    cuts.sort_unstable();
    let [q0, q1, q2, q3] = cuts;

    let mut out = Vec::with_capacity(n);
    out.extend_from_slice(&order[q0..q1]);
    out.extend_from_slice(&order[q2..q3]);
    out.extend_from_slice(&order[q1..q2]);
    out.extend_from_slice(&order[q3..]);
    out.extend_from_slice(&order[..q0]);

    let mut touched = [0; 8];
    for (i, &q) in cuts.iter().enumerate() {
        touched[2 * i] = order[q];
        touched[2 * i + 1] = order[(q + n - 1) % n];
    }
    Kicked {
        order: out,
        touched,
    }
}

fn random_cuts<R: Rng>(n: usize, rng: &mut R) -> [usize; 4] {
    let picked = sample(rng, n, 4).into_vec();
    [picked[0], picked[1], picked[2], picked[3]]
}

fn positions(order: &[usize]) -> Vec<usize> {
    let mut pos = vec![0; order.len()];
    for (i, &v) in order.iter().enumerate() {
        pos[v] = i;
    }
    pos
}

/// Picks three cut positions among `pool` in addition to `anchor`.
fn cuts_from_pool<R: Rng>(anchor: usize, pool: &[usize], rng: &mut R) -> Option<[usize; 4]> {
    if pool.len() < 3 {
        return None;
    }
    let picked = sample(rng, pool.len(), 3).into_vec();
    Some([anchor, pool[picked[0]], pool[picked[1]], pool[picked[2]]])
}

fn close_cuts<R: Rng>(
    order: &[usize],
    candidates: &[Vec<usize>],
    rng: &mut R,
) -> Option<[usize; 4]> {
    let pos = positions(order);
    let v = order[rng.random_range(0..order.len())];

    let mut pool: Vec<usize> = Vec::new();
    for &w in &candidates[v] {
        pool.push(w);
        pool.extend(candidates[w].iter().copied());
    }
    let mut slots: Vec<usize> = pool.into_iter().map(|w| pos[w]).collect();
    slots.sort_unstable();
    slots.dedup();
    slots.retain(|&p| p != pos[v]);
    cuts_from_pool(pos[v], &slots, rng)
}

fn walk_cuts<R: Rng>(
    order: &[usize],
    candidates: &[Vec<usize>],
    rng: &mut R,
) -> Option<[usize; 4]> {
    let pos = positions(order);
    let start = order[rng.random_range(0..order.len())];

    let mut slots = Vec::new();
    let mut cur = start;
    for _ in 0..WALK_STEPS {
        let near = &candidates[cur];
        if near.is_empty() {
            break;
        }
        cur = near[rng.random_range(0..near.len())];
        if cur != start {
            slots.push(pos[cur]);
        }
    }
    slots.sort_unstable();
    slots.dedup();
    cuts_from_pool(pos[start], &slots, rng)
}
