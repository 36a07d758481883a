//! Instance generators and a brute-force reference solver.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_tsp::graph::Cost;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Upper-triangle edge list of the complete graph on `n` nodes.
pub fn complete_edges(n: usize) -> Vec<(usize, usize)> {
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for u in 0..n {
        for v in (u + 1)..n {
            edges.push((u, v));
        }
    }
    edges
}

/// Complete graph with costs from random points on a 1000x1000 grid.
pub fn euclidean(n: usize, seed: u64) -> (Vec<(usize, usize)>, Vec<Cost>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
        .collect();
    let edges = complete_edges(n);
    let costs = edges
        .iter()
        .map(|&(u, v)| {
            let (dx, dy) = (points[u].0 - points[v].0, points[u].1 - points[v].1);
            (dx * dx + dy * dy).sqrt().round() as Cost
        })
        .collect();
    (edges, costs)
}

/// Complete graph with uniform random costs in `1..max`.
pub fn random_costs(n: usize, max: Cost, seed: u64) -> (Vec<(usize, usize)>, Vec<Cost>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let edges = complete_edges(n);
    let costs = edges.iter().map(|_| rng.random_range(1..max)).collect();
    (edges, costs)
}

fn lookup(n: usize, edges: &[(usize, usize)], costs: &[Cost]) -> Vec<Vec<Option<Cost>>> {
    let mut table = vec![vec![None; n]; n];
    for (&(u, v), &c) in edges.iter().zip(costs) {
        table[u][v] = Some(c);
        table[v][u] = Some(c);
    }
    table
}

/// Cost of the cyclic tour, or None if it uses a missing edge.
pub fn tour_cost(n: usize, edges: &[(usize, usize)], costs: &[Cost], tour: &[usize]) -> Option<Cost> {
    let table = lookup(n, edges, costs);
    (0..tour.len())
        .map(|i| table[tour[i]][tour[(i + 1) % tour.len()]])
        .sum()
}

/// True iff every consecutive pair of `tour` (cyclically) is an input edge.
pub fn uses_only_input_edges(n: usize, edges: &[(usize, usize)], tour: &[usize]) -> bool {
    let costs = vec![0; edges.len()];
    tour_cost(n, edges, &costs, tour).is_some()
}

pub fn is_permutation(tour: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    tour.len() == n
        && tour
            .iter()
            .all(|&v| v < n && !std::mem::replace(&mut seen[v], true))
}

/// Optimal tour cost by enumeration with node 0 fixed. None if the graph
/// has no Hamiltonian cycle.
pub fn brute_force(n: usize, edges: &[(usize, usize)], costs: &[Cost]) -> Option<Cost> {
    let table = lookup(n, edges, costs);
    let mut rest: Vec<usize> = (1..n).collect();
    let mut best = None;
    permute(&table, &mut rest, 0, &mut best);
    best
}

fn permute(table: &[Vec<Option<Cost>>], rest: &mut [usize], k: usize, best: &mut Option<Cost>) {
    if k == rest.len() {
        let mut tour = vec![0];
        tour.extend_from_slice(rest);
        let cost: Option<Cost> = (0..tour.len())
            .map(|i| table[tour[i]][tour[(i + 1) % tour.len()]])
            .sum();
        if let Some(cost) = cost {
            if best.is_none_or(|b| cost < b) {
                *best = Some(cost);
            }
        }
        return;
    }
    for i in k..rest.len() {
        rest.swap(k, i);
        permute(table, rest, k + 1, best);
        rest.swap(k, i);
    }
}
