mod common;

use common::*;
use std::time::{Duration, Instant};
use u_tsp::report::ReturnCode;
use u_tsp::{solve_exact, solve_exact_dense, SolveOptions, SolveStatus, TspError};

#[test]
fn test_four_node_scenario() {
    init_logger();
    let edges = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
    let costs = [1, 3, 4, 5, 2, 6];
    let report = solve_exact(4, &edges, &costs, &SolveOptions::default()).unwrap();

    assert_eq!(report.status, SolveStatus::Optimal);
    assert_eq!(report.cost, Some(12));
    assert!(report.feasible);
    assert_eq!(report.return_code(), ReturnCode::Ok);

    // 0-1-3-2-0 up to rotation and direction.
    let start = report.tour.iter().position(|&v| v == 0).unwrap();
    let rotated: Vec<usize> = (0..4).map(|i| report.tour[(start + i) % 4]).collect();
    assert!(rotated == [0, 1, 3, 2] || rotated == [0, 2, 3, 1], "{rotated:?}");
}

#[test]
fn test_two_nodes_traverse_edge_twice() {
    let report = solve_exact(2, &[(0, 1)], &[7], &SolveOptions::default()).unwrap();
    assert_eq!(report.status, SolveStatus::Optimal);
    assert_eq!(report.tour, vec![0, 1]);
    assert_eq!(report.cost, Some(14));
    assert!(report.feasible);
}

#[test]
fn test_matches_brute_force_on_small_complete_graphs() {
    init_logger();
    for n in 5..=8 {
        for seed in 0..3 {
            let (edges, costs) = euclidean(n, seed * 100 + n as u64);
            let optimum = brute_force(n, &edges, &costs);
            let report = solve_exact(n, &edges, &costs, &SolveOptions::default()).unwrap();
            assert_eq!(report.status, SolveStatus::Optimal, "n={n} seed={seed}");
            assert_eq!(report.cost, optimum, "n={n} seed={seed}");
            assert_eq!(tour_cost(n, &edges, &costs, &report.tour), report.cost);
        }
    }
}

#[test]
fn test_matches_brute_force_on_random_costs() {
    for seed in 0..4 {
        let (edges, costs) = random_costs(8, 50, seed);
        let report = solve_exact(8, &edges, &costs, &SolveOptions::default()).unwrap();
        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(report.cost, brute_force(8, &edges, &costs), "seed={seed}");
    }
}

#[test]
fn test_sparse_graph_uses_input_edges() {
    // Ring 0..8 plus chords; the ring is one Hamiltonian cycle.
    let mut edges: Vec<(usize, usize)> = (0..8).map(|i| (i, (i + 1) % 8)).collect();
    edges.extend([(0, 4), (1, 5), (2, 6), (3, 7), (0, 2), (5, 7)]);
    let costs: Vec<i64> = edges.iter().map(|&(u, v)| ((u * 7 + v * 3) % 11 + 1) as i64).collect();

    let report = solve_exact(8, &edges, &costs, &SolveOptions::default()).unwrap();
    assert_eq!(report.status, SolveStatus::Optimal);
    assert!(uses_only_input_edges(8, &edges, &report.tour));
    assert_eq!(report.cost, brute_force(8, &edges, &costs));
}

#[test]
fn test_graph_without_tour_reports_failure() {
    // Two triangles joined by one bridge.
    let edges = [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)];
    let costs = [1; 7];
    let report = solve_exact(6, &edges, &costs, &SolveOptions::default()).unwrap();
    assert!(!report.feasible);
    assert!(report.tour.is_empty());
    assert_eq!(report.status, SolveStatus::Unknown);
    assert_eq!(report.return_code(), ReturnCode::Failure);
}

#[test]
fn test_seeded_solves_are_identical() {
    let (edges, costs) = euclidean(12, 7);
    let options = SolveOptions::default().with_seed(9);
    let first = solve_exact(12, &edges, &costs, &options).unwrap();
    let second = solve_exact(12, &edges, &costs, &options).unwrap();
    assert_eq!(first.tour, second.tour);
    assert_eq!(first.cost, second.cost);
    assert_eq!(first.status, second.status);
}

#[test]
fn test_warm_start_never_worsens() {
    let (edges, costs) = euclidean(14, 3);
    let start: Vec<usize> = (0..14).rev().collect();
    let start_cost = tour_cost(14, &edges, &costs, &start).unwrap();
    let options = SolveOptions::default()
        .with_start_tour(start)
        .with_time_limit(Duration::from_secs(30));
    let report = solve_exact(14, &edges, &costs, &options).unwrap();
    assert!(report.feasible);
    assert!(report.cost.unwrap() <= start_cost);
}

#[test]
fn test_target_stops_early() {
    let (edges, costs) = euclidean(10, 21);
    let start: Vec<usize> = (0..10).collect();
    let start_cost = tour_cost(10, &edges, &costs, &start).unwrap();
    let options = SolveOptions::default()
        .with_start_tour(start)
        .with_target(start_cost);
    let report = solve_exact(10, &edges, &costs, &options).unwrap();
    assert!(report.cost.unwrap() <= start_cost);
    assert!(matches!(
        report.status,
        SolveStatus::TargetReached | SolveStatus::Optimal
    ));
}

#[test]
fn test_zero_time_limit_on_large_instance() {
    init_logger();
    let (edges, costs) = random_costs(1000, 10_000, 1);
    let options = SolveOptions::default().with_time_limit(Duration::ZERO);
    let started = Instant::now();
    let report = solve_exact(1000, &edges, &costs, &options).unwrap();
    assert_eq!(report.status, SolveStatus::TimeLimit);
    if report.feasible {
        assert!(is_permutation(&report.tour, 1000));
    }
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[test]
fn test_dense_matrix_entry_point() {
    let matrix = vec![
        vec![0, 2, 9, 10],
        vec![1, 0, 6, 4],
        vec![15, 7, 0, 8],
        vec![6, 3, 12, 0],
    ];
    // Only the upper triangle is read.
    let edges = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
    let costs = [2, 9, 10, 6, 4, 8];
    let report = solve_exact_dense(&matrix, &SolveOptions::default()).unwrap();
    assert_eq!(report.status, SolveStatus::Optimal);
    assert_eq!(report.cost, brute_force(4, &edges, &costs));
}

#[test]
fn test_malformed_input_is_rejected() {
    let options = SolveOptions::default();
    assert!(matches!(
        solve_exact(3, &[(0, 1), (1, 2)], &[1], &options),
        Err(TspError::InvalidInstance(_))
    ));
    assert!(solve_exact(3, &[(0, 5)], &[1], &options).is_err());
    assert!(solve_exact(3, &[(0, 1), (1, 0)], &[1, 1], &options).is_err());
}
