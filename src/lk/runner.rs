//! Chained Lin-Kernighan execution engine.
//!
//! # Algorithm
//!
//! 1. Build a greedy-edge tour (or take the caller's start tour)
//! 2. Run LK chains from every queued node until the queue is empty
//! 3. While no stopping rule fires:
//!    a. **Kick**: double bridge on the best tour
//!    b. **Local search**: LK chains from the eight kicked endpoints
//!    c. **Accept or revert**: keep the result if it is no worse than
//!    the best tour, otherwise return to the best tour
//! 4. Return the best tour found
//!
//! # References
//!
//! - Lin, S. & Kernighan, B. W. (1973). "An effective heuristic algorithm
//!   for the traveling-salesman problem", *Operations Research* 21(2), 498-516.
//! - Applegate, Cook & Rohe (2003), "Chained Lin-Kernighan for large
//!   traveling salesman problems", *INFORMS Journal on Computing* 15(1).

use super::array::ArrayTour;
use super::config::LkConfig;
use super::construct::greedy_tour;
use super::kick::double_bridge;
use super::penalty::PenalizedCosts;
use super::types::LkStopReason;
use crate::error::{Result, TspError};
use crate::graph::{Cost, Instance, Tour};
use crate::logging::progress;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How many queue pops happen between two clock checks inside a descent.
const CLOCK_INTERVAL: usize = 64;

/// Result of a Lin-Kernighan run.
#[derive(Debug, Clone)]
pub struct LkResult {
    /// Best tour found. Always a permutation of all nodes.
    pub tour: Tour,

    /// Cost of `tour`. If the tour is infeasible, missing edges are
    /// counted at the penalty price.
    pub cost: Cost,

    /// Whether every edge of `tour` is an instance edge.
    pub feasible: bool,

    /// Number of kicks applied.
    pub kicks: usize,

    /// Number of improving LK chains applied.
    pub improvements: usize,

    /// Best cost after the initial descent and after every kick.
    pub cost_history: Vec<Cost>,

    /// Why the run stopped.
    pub stop_reason: LkStopReason,
}

/// Wall clock and cancellation shared by the outer loop and descents.
struct Clock {
    start: Instant,
    limit: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Clock {
    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.start.elapsed() >= limit)
    }

    fn should_stop(&self) -> bool {
        self.cancelled() || self.expired()
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

/// Mutable state of one LK run.
struct Search<'a> {
    costs: PenalizedCosts<'a>,
    candidates: Vec<Vec<usize>>,
    tour: ArrayTour,
    queue: VecDeque<usize>,
    queued: Vec<bool>,
    max_depth: usize,
    breadth: usize,
    improvements: usize,
    // Scratch for the chain in progress.
    flips: Vec<(usize, usize)>,
    steps: Vec<[usize; 3]>,
    added: Vec<(usize, usize)>,
    removed: Vec<(usize, usize)>,
}

impl<'a> Search<'a> {
    fn new(
        costs: PenalizedCosts<'a>,
        candidates: Vec<Vec<usize>>,
        order: Vec<usize>,
        config: &LkConfig,
    ) -> Self {
        let n = order.len();
        Self {
            costs,
            candidates,
            tour: ArrayTour::new(order),
            queue: VecDeque::with_capacity(n),
            queued: vec![false; n],
            max_depth: config.max_depth,
            breadth: config.breadth,
            improvements: 0,
            flips: Vec::new(),
            steps: Vec::new(),
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    #[inline]
    fn c(&self, u: usize, v: usize) -> Cost {
        self.costs.cost(u, v)
    }

    fn enqueue(&mut self, v: usize) {
        if !self.queued[v] {
            self.queued[v] = true;
            self.queue.push_back(v);
        }
    }

    fn reset(&mut self, order: Vec<usize>) {
        self.tour = ArrayTour::new(order);
        self.queue.clear();
        self.queued.iter_mut().for_each(|q| *q = false);
    }

    fn cost(&self) -> Cost {
        self.costs.tour_cost(&self.tour.to_order())
    }

    /// Runs LK chains until no queued node yields an improvement, or the
    /// clock says stop. Returns the total gain.
    fn descend(&mut self, clock: &Clock) -> Cost {
        let mut gain = 0;
        let mut pops = 0usize;
        while let Some(t1) = self.queue.pop_front() {
            self.queued[t1] = false;
            pops += 1;
            if pops % CLOCK_INTERVAL == 0 && clock.should_stop() {
                break;
            }

            for _ in 0..2 {
                if let Some(g) = self.chain(t1) {
                    gain += g;
                    self.improvements += 1;
                    self.enqueue(t1);
                    let touched: Vec<usize> = self.steps.iter().flatten().copied().collect();
                    for v in touched {
                        self.enqueue(v);
                    }
                    break;
                }
                // Try the other tour neighbour of t1 as t2.
                self.tour.flip_orientation();
            }
        }
        gain
    }

    fn undo_to(&mut self, len: usize) {
        while self.flips.len() > len {
            if let Some((a, b)) = self.flips.pop() {
                self.tour.reverse_path(b, a);
            }
            self.steps.pop();
        }
    }

    /// Applies one exchange: adds (t2,t3), removes (t3,t4), leaving t4
    /// as the new successor of t1.
    fn apply_step(&mut self, t2: usize, t3: usize, t4: usize) {
        self.tour.reverse_path(t2, t4);
        self.flips.push((t2, t4));
        self.steps.push([t2, t3, t4]);
        self.added.push(key(t2, t3));
        self.removed.push(key(t3, t4));
    }

    /// Searches for an improving chain that starts by removing
    /// `(t1, next(t1))`. On success the improvement stays applied and the
    /// gain is returned; otherwise the tour is left unchanged.
    fn chain(&mut self, t1: usize) -> Option<Cost> {
        let t2 = self.tour.next(t1);
        let g0 = self.c(t1, t2);

        let mut firsts: Vec<(Cost, usize, usize)> = Vec::new();
        for &t3 in &self.candidates[t2] {
            if t3 == t1 || t3 == self.tour.next(t2) {
                continue;
            }
            let g1 = g0 - self.c(t2, t3);
            if g1 <= 0 {
                break;
            }
            let t4 = self.tour.prev(t3);
            firsts.push((g1 + self.c(t3, t4), t3, t4));
        }
        firsts.sort_by(|a, b| b.0.cmp(&a.0));
        firsts.truncate(self.breadth);

        for (_, t3, t4) in firsts {
            self.flips.clear();
            self.steps.clear();
            self.added.clear();
            self.removed.clear();
            self.removed.push(key(t1, t2));

            let mut g = g0 - self.c(t2, t3) + self.c(t3, t4);
            self.apply_step(t2, t3, t4);
            let mut best_gain = g - self.c(t4, t1);
            let mut best_len = 1;
            let mut last = t4;

            while self.flips.len() < self.max_depth {
                let Some((t3, t4)) = self.pick_step(t1, last, g) else {
                    break;
                };
                g = g - self.c(last, t3) + self.c(t3, t4);
                self.apply_step(last, t3, t4);
                let close = g - self.c(t4, t1);
                if close > best_gain {
                    best_gain = close;
                    best_len = self.flips.len();
                }
                last = t4;
            }

            self.undo_to(best_len);
            if best_gain > 0 {
                return Some(best_gain);
            }
            self.undo_to(0);
        }
        None
    }

    /// Greedy choice of the next exchange from `t2`, maximizing the gain
    /// after removing `(t3, t4)`.
    fn pick_step(&self, t1: usize, t2: usize, g: Cost) -> Option<(usize, usize)> {
        let mut best: Option<(Cost, usize, usize)> = None;
        let succ = self.tour.next(t2);
        for &t3 in &self.candidates[t2] {
            if t3 == t1 || t3 == succ {
                continue;
            }
            let gi = g - self.c(t2, t3);
            if gi <= 0 {
                break;
            }
            if self.removed.contains(&key(t2, t3)) {
                continue;
            }
            let t4 = self.tour.prev(t3);
            if self.added.contains(&key(t3, t4)) {
                continue;
            }
            let score = gi + self.c(t3, t4);
            if best.is_none_or(|(s, _, _)| score > s) {
                best = Some((score, t3, t4));
            }
        }
        best.map(|(_, t3, t4)| (t3, t4))
    }
}

fn candidate_lists(instance: &Instance, k: usize) -> Vec<Vec<usize>> {
    (0..instance.node_count())
        .map(|v| {
            instance
                .neighbors(v)
                .iter()
                .take(k)
                .map(|&(w, _)| w)
                .collect()
        })
        .collect()
}

/// Chained Lin-Kernighan runner.
pub struct LkRunner;

impl LkRunner {
    /// Improves `start` (or a greedy tour) on `instance`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_tsp::graph::Instance;
    /// use u_tsp::lk::{LkConfig, LkRunner};
    ///
    /// let inst = Instance::new(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
    ///                          &[1, 3, 4, 5, 2, 6]).unwrap();
    /// let result = LkRunner::run(&inst, &LkConfig::default().with_seed(1), None).unwrap();
    /// assert!(result.feasible);
    /// assert_eq!(result.cost, 12);
    /// ```
    pub fn run(instance: &Instance, config: &LkConfig, start: Option<&Tour>) -> Result<LkResult> {
        Self::run_with_cancel(instance, config, start, None)
    }

    /// Runs LK with an optional cancellation token, checked at the top of
    /// every kick iteration and periodically inside descents.
    pub fn run_with_cancel(
        instance: &Instance,
        config: &LkConfig,
        start: Option<&Tour>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<LkResult> {
        config.validate().map_err(TspError::invalid_config)?;
        let clock = Clock {
            start: Instant::now(),
            limit: config.time_limit,
            cancel,
        };

        let n = instance.node_count();
        let costs = PenalizedCosts::new(instance)?;
        let order = match start {
            Some(tour) if tour.len() != n => {
                return Err(TspError::invalid_instance(format!(
                    "start tour has {} nodes, expected {n}",
                    tour.len()
                )));
            }
            Some(tour) => tour.order().to_vec(),
            None => greedy_tour(&costs),
        };

        let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(42));
        let candidates = candidate_lists(instance, config.candidates);
        let mut best_cost = costs.tour_cost(&order);
        let mut best_order = order.clone();
        let mut search = Search::new(costs, candidates, order, config);
        let mut cost_history = vec![best_cost];

        let max_kicks = config.max_kicks.unwrap_or(n);
        let mut kicks = 0usize;
        let mut stall = 0usize;
        let mut descended = false;

        let stop_reason = loop {
            if n <= 3 {
                break LkStopReason::Trivial;
            }
            if clock.cancelled() {
                break LkStopReason::Cancelled;
            }
            if clock.expired() {
                break LkStopReason::TimeLimit;
            }
            if config.target.is_some_and(|target| best_cost <= target) {
                break LkStopReason::TargetReached;
            }
            if stall >= config.stall_count {
                break LkStopReason::Stalled;
            }
            if descended && kicks >= max_kicks {
                break LkStopReason::KickLimit;
            }

            if !descended {
                for v in 0..n {
                    search.enqueue(v);
                }
                let gain = search.descend(&clock);
                best_cost -= gain;
                best_order = search.tour.to_order();
                cost_history.push(best_cost);
                descended = true;
                progress!(config.verbose, "lk: initial descent cost={best_cost}");
                continue;
            }

            let kicked = double_bridge(&best_order, config.kick, &search.candidates, &mut rng);
            search.reset(kicked.order);
            for v in kicked.touched {
                search.enqueue(v);
            }
            search.descend(&clock);
            kicks += 1;

            let cost = search.cost();
            if cost < best_cost {
                best_cost = cost;
                best_order = search.tour.to_order();
                stall = 0;
                progress!(config.verbose, "lk: kick={kicks} best={best_cost}");
            } else {
                if cost == best_cost {
                    best_order = search.tour.to_order();
                }
                stall += 1;
            }
            cost_history.push(best_cost);
        };

        let tour = Tour::from_permutation(best_order);
        let feasible = tour.is_feasible(instance);
        log::debug!(
            "lk: done reason={stop_reason:?} cost={best_cost} feasible={feasible} kicks={kicks} elapsed_ms={}",
            clock.start.elapsed().as_millis()
        );

        Ok(LkResult {
            tour,
            cost: best_cost,
            feasible,
            kicks,
            improvements: search.improvements,
            cost_history,
            stop_reason,
        })
    }
}
