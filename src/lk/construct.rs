//! Greedy-edge tour construction.

use super::penalty::PenalizedCosts;
use crate::graph::union_find::UnionFind;
use crate::graph::{EdgeId, Instance};

const NONE: usize = usize::MAX;

/// Greedy-edge tour: cheapest edges first.
pub(crate) fn greedy_tour(costs: &PenalizedCosts<'_>) -> Vec<usize> {
    let instance = costs.instance();
    let mut ids: Vec<EdgeId> = (0..instance.edge_count()).collect();
    ids.sort_by_key(|&id| (instance.edge(id).cost, id));
    greedy_from_order(costs, &ids)
}

/// Builds a tour by scanning `ids` in order and keeping every edge that
/// leaves both endpoints with degree at most two and closes no cycle.
///
/// The resulting path fragments are chained tail to head, preferring the
/// cheapest instance edge from the current tail to an unused fragment end;
/// a penalty edge is used only when no instance edge reaches one.
pub(crate) fn greedy_from_order(costs: &PenalizedCosts<'_>, ids: &[EdgeId]) -> Vec<usize> {
    let instance = costs.instance();
    let n = instance.node_count();
    let mut links = vec![[NONE, NONE]; n];
    let mut uf = UnionFind::new(n);
    let mut added = 0;

    for &id in ids {
        if added + 1 == n {
            break;
        }
        let e = instance.edge(id);
        if links[e.u][1] != NONE || links[e.v][1] != NONE {
            continue;
        }
        if !uf.union(e.u, e.v) {
            continue;
        }
        attach(&mut links[e.u], e.v);
        attach(&mut links[e.v], e.u);
        added += 1;
    }

    chain_fragments(instance, &links)
}

#[inline]
fn attach(slot: &mut [usize; 2], w: usize) {
    if slot[0] == NONE {
        slot[0] = w;
    } else {
        slot[1] = w;
    }
}

fn is_endpoint(links: &[[usize; 2]], v: usize) -> bool {
    links[v][1] == NONE
}

fn chain_fragments(instance: &Instance, links: &[[usize; 2]]) -> Vec<usize> {
    let n = links.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut scan = 0;

    let mut head = (0..n).find(|&v| is_endpoint(links, v)).unwrap_or(0);
    loop {
        // Walk the fragment that starts at `head`.
        let mut prev = NONE;
        let mut cur = head;
        loop {
            visited[cur] = true;
            order.push(cur);
            let next = links[cur]
                .iter()
                .copied()
                .find(|&w| w != NONE && w != prev && !visited[w]);
            match next {
                Some(w) => {
                    prev = cur;
                    cur = w;
                }
                None => break,
            }
        }
        if order.len() == n {
            break;
        }

        let tail = cur;
        let via_edge = instance
            .neighbors(tail)
            .iter()
            .map(|&(w, _)| w)
            .find(|&w| !visited[w] && is_endpoint(links, w));
        head = match via_edge {
            Some(w) => w,
            None => {
                while visited[scan] || !is_endpoint(links, scan) {
                    scan += 1;
                }
                scan
            }
        };
    }
    order
}
