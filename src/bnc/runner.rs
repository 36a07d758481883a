//! Branch-and-cut execution engine.
//!
//! # Algorithm
//!
//! 1. Seed the incumbent with the start tour and a warm-start LK run
//! 2. Pop the open node with the best bound (or the deepest one)
//! 3. Solve its relaxation: LP over all edges and cutting rounds
//! 4. Prune it, install its integral tour, or branch on the fractional
//!    edge closest to 1/2
//! 5. Repeat until the work list is empty or a limit fires
//!
//! Time, target, node limit and cancellation are polled before every node
//! is popped and between cutting rounds, never inside an LP solve.
//!
//! # References
//!
//! - Padberg, M. & Rinaldi, G. (1991). "A branch-and-cut algorithm for the
//!   resolution of large-scale symmetric traveling salesman problems",
//!   *SIAM Review* 33(1), 60-100.
//! - Applegate, Bixby, Chvátal & Cook (2006), *The Traveling Salesman
//!   Problem: A Computational Study*.

use super::config::BncConfig;
use super::cut::CutPool;
use super::incumbent::SharedIncumbent;
use super::relaxation::{dominated, solve_node, NodeContext, Relaxation};
use super::tree::{SearchNode, WorkList};
use super::types::{BncStats, BncStopReason};
use crate::error::{Result, TspError};
use crate::graph::{Cost, EdgeId, Instance, Tour};
use crate::lk::construct::greedy_from_order;
use crate::lk::penalty::PenalizedCosts;
use crate::lk::{LkConfig, LkRunner};
use crate::logging::progress;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Kick budget of the LK run embedded at the root.
const EMBEDDED_KICKS: usize = 100;

/// Result of a branch-and-cut run.
#[derive(Debug, Clone)]
pub struct BncResult {
    /// Best feasible tour found, if any.
    pub tour: Option<Tour>,

    /// Cost of `tour`.
    pub cost: Option<Cost>,

    /// Proven lower bound on the optimal cost. Equals `cost` when the run
    /// proved optimality; `None` if no relaxation finished or no tour exists.
    pub lower_bound: Option<f64>,

    /// Why the run stopped.
    pub reason: BncStopReason,

    /// Whether a feasible tour was found.
    pub feasible: bool,

    /// Search statistics.
    pub stats: BncStats,
}

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

    fn remaining(&self) -> Option<Duration> {
        self.limit
            .map(|limit| limit.saturating_sub(self.start.elapsed()))
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct WorkState {
    list: WorkList,
    /// Workers currently processing a node.
    active: usize,
    /// Nodes handed out so far.
    started: usize,
    done: bool,
}

/// State shared by all workers of one run.
struct Search<'a> {
    instance: &'a Instance,
    config: &'a BncConfig,
    costs: PenalizedCosts<'a>,
    sorted_edges: Vec<EdgeId>,
    clock: Clock,
    incumbent: SharedIncumbent,
    pool: Mutex<CutPool>,
    work: Mutex<WorkState>,
    ready: Condvar,
    reason: Mutex<Option<BncStopReason>>,
    halted: AtomicBool,
}

impl<'a> Search<'a> {
    fn target_reached(&self) -> bool {
        self.incumbent.has_tour()
            && self
                .config
                .target
                .is_some_and(|target| self.incumbent.upper_bound() <= target)
    }

    /// Checked between cutting rounds.
    fn interrupted(&self) -> bool {
        self.halted.load(Ordering::Relaxed)
            || self.clock.cancelled()
            || self.clock.expired()
            || self.target_reached()
    }

    /// Checked before each node is handed out.
    fn poll(&self, started: usize) -> Option<BncStopReason> {
        if self.clock.cancelled() {
            Some(BncStopReason::Cancelled)
        } else if self.clock.expired() {
            Some(BncStopReason::TimeLimit)
        } else if self.target_reached() {
            Some(BncStopReason::TargetReached)
        } else if self.config.max_nodes.is_some_and(|max| started >= max) {
            Some(BncStopReason::NodeLimit)
        } else {
            None
        }
    }

    fn halt(&self, work: &mut WorkState, reason: BncStopReason) {
        lock(&self.reason).get_or_insert(reason);
        self.halted.store(true, Ordering::Relaxed);
        work.done = true;
        self.ready.notify_all();
    }

    fn offer(&self, tour: &Tour, cost: Cost, source: &str) {
        if self.incumbent.try_install(tour, cost) {
            progress!(
                self.config.verbose,
                "bnc: incumbent cost={cost} source={source} elapsed_ms={}",
                self.clock.start.elapsed().as_millis()
            );
        }
    }

    /// LK settings for a run that may use `share` of the remaining time.
    fn heuristic_config(&self, share: f64, kicks: Option<usize>) -> LkConfig {
        let mut lk = self.config.heuristic.clone();
        lk.seed = lk.seed.or(self.config.seed);
        lk.verbose |= self.config.verbose;
        lk.target = lk.target.or(self.config.target);
        if let Some(remaining) = self.clock.remaining() {
            let slice = remaining.mul_f64(share);
            lk.time_limit = Some(lk.time_limit.map_or(slice, |t| t.min(slice)));
        }
        if lk.max_kicks.is_none() {
            lk.max_kicks = kicks;
        }
        lk
    }

    fn run_heuristic(&self, lk: &LkConfig, start: Option<&Tour>, source: &str) {
        match LkRunner::run_with_cancel(self.instance, lk, start, self.clock.cancel.clone()) {
            Ok(result) if result.feasible => self.offer(&result.tour, result.cost, source),
            Ok(result) => log::debug!("bnc: {source} tour infeasible cost={}", result.cost),
            Err(err) => log::warn!("bnc: {source} heuristic failed: {err}"),
        }
    }

    /// Greedy tour preferring edges with large LP value, then LK.
    fn lp_guided_heuristic(&self, point: &[(EdgeId, f64)]) {
        let mut ids: Vec<(EdgeId, f64)> = point.to_vec();
        ids.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| self.instance.edge(a.0).cost.cmp(&self.instance.edge(b.0).cost))
                .then(a.0.cmp(&b.0))
        });
        let order: Vec<EdgeId> = ids
            .into_iter()
            .map(|(e, _)| e)
            .chain(self.sorted_edges.iter().copied())
            .collect();
        let start = Tour::from_permutation(greedy_from_order(&self.costs, &order));
        let n = self.instance.node_count();
        let lk = self.heuristic_config(self.config.heuristic_share, Some(n.min(EMBEDDED_KICKS)));
        self.run_heuristic(&lk, Some(&start), "lp-guided");
    }

    fn is_fractional(&self, x: f64) -> bool {
        let eps = self.config.integrality_tol;
        x > eps && x < 1.0 - eps
    }

    /// Fractional, unfixed edge closest to 1/2; ties go to the larger cost.
    fn branch_edge(&self, point: &[(EdgeId, f64)], node: &SearchNode) -> Option<EdgeId> {
        point
            .iter()
            .filter(|&&(e, x)| self.is_fractional(x) && node.fixing(e).is_none())
            .min_by(|a, b| {
                (a.1 - 0.5)
                    .abs()
                    .total_cmp(&(b.1 - 0.5).abs())
                    .then_with(|| self.instance.edge(b.0).cost.cmp(&self.instance.edge(a.0).cost))
                    .then(a.0.cmp(&b.0))
            })
            .map(|&(e, _)| e)
    }

    /// Branching edge after the node's own LP gave no usable point.
    fn fallback_edge(&self, node: &SearchNode, point: &[(EdgeId, f64)]) -> Option<EdgeId> {
        self.branch_edge(&node.parent_point, node)
            .or_else(|| {
                point
                    .iter()
                    .map(|&(e, _)| e)
                    .find(|&e| node.fixing(e).is_none())
            })
            .or_else(|| (0..self.instance.edge_count()).find(|&e| node.fixing(e).is_none()))
    }

    fn split(
        &self,
        node: &SearchNode,
        edge: EdgeId,
        bound: f64,
        cuts: &[usize],
        point: &[(EdgeId, f64)],
    ) -> Vec<SearchNode> {
        vec![
            node.child(edge, true, bound, cuts, point),
            node.child(edge, false, bound, cuts, point),
        ]
    }

    /// Hamiltonian cycle formed by the edges at 1, if they form one.
    fn integral_tour(&self, point: &[(EdgeId, f64)]) -> Option<Tour> {
        let n = self.instance.node_count();
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(e, x) in point {
            if x >= 1.0 - self.config.integrality_tol {
                let edge = self.instance.edge(e);
                adj[edge.u].push(edge.v);
                adj[edge.v].push(edge.u);
            }
        }
        if adj.iter().any(|a| a.len() != 2) {
            return None;
        }
        let mut order = Vec::with_capacity(n);
        let (mut prev, mut cur) = (adj[0][1], 0);
        loop {
            order.push(cur);
            let next = if adj[cur][0] == prev { adj[cur][1] } else { adj[cur][0] };
            prev = cur;
            cur = next;
            if cur == 0 || order.len() > n {
                break;
            }
        }
        (order.len() == n).then(|| Tour::from_permutation(order))
    }

    /// Processes one node; returns the nodes to put back on the list.
    fn process(&self, node: SearchNode, stats: &mut BncStats) -> Vec<SearchNode> {
        let eps = self.config.integrality_tol;
        if dominated(node.bound, self.incumbent.upper_bound(), eps) {
            stats.nodes_pruned += 1;
            return Vec::new();
        }

        let interrupted = || self.interrupted();
        let ctx = NodeContext {
            instance: self.instance,
            config: self.config,
            pool: &self.pool,
            incumbent: &self.incumbent,
            interrupted: &interrupted,
        };
        let relaxation = solve_node(&ctx, &node, stats);
        if !matches!(relaxation, Relaxation::Interrupted) {
            stats.nodes_explored += 1;
            stats.max_depth = stats.max_depth.max(node.depth);
        }

        match relaxation {
            // Back on the list so its bound still counts.
            Relaxation::Interrupted => vec![node],
            Relaxation::Infeasible => {
                stats.nodes_pruned += 1;
                Vec::new()
            }
            Relaxation::Dominated { bound } => {
                log::trace!("bnc: prune depth={} bound={bound:.3}", node.depth);
                stats.nodes_pruned += 1;
                Vec::new()
            }
            Relaxation::Failed => {
                log::debug!("bnc: lp failed depth={} branching on fallback", node.depth);
                match self.fallback_edge(&node, &[]) {
                    Some(e) => self.split(&node, e, node.bound, &node.cuts, &node.parent_point),
                    None => {
                        stats.nodes_pruned += 1;
                        Vec::new()
                    }
                }
            }
            Relaxation::Solved { bound, point, cuts } => {
                if node.depth == 0 {
                    progress!(
                        self.config.verbose,
                        "bnc: root bound={bound:.3} cuts={} pooled={}",
                        cuts.len(),
                        lock(&self.pool).len()
                    );
                }
                if point.iter().all(|&(_, x)| !self.is_fractional(x)) {
                    if let Some(tour) = self.integral_tour(&point) {
                        if let Some(cost) = tour.cost(self.instance) {
                            self.offer(&tour, cost, "lp");
                        }
                        return Vec::new();
                    }
                    log::debug!("bnc: integral point is not a tour depth={}", node.depth);
                    return match self.fallback_edge(&node, &point) {
                        Some(e) => self.split(&node, e, bound, &cuts, &point),
                        None => Vec::new(),
                    };
                }

                if node.depth == 0 && self.config.initial_heuristic {
                    self.lp_guided_heuristic(&point);
                }
                if dominated(bound, self.incumbent.upper_bound(), eps) {
                    stats.nodes_pruned += 1;
                    return Vec::new();
                }
                match self.branch_edge(&point, &node) {
                    Some(e) => {
                        log::trace!(
                            "bnc: branch depth={} edge={e} bound={bound:.3}",
                            node.depth
                        );
                        self.split(&node, e, bound, &cuts, &point)
                    }
                    None => Vec::new(),
                }
            }
        }
    }

    /// One worker loop over the shared work list.
    fn worker(&self) -> BncStats {
        let mut stats = BncStats::default();
        loop {
            let node = {
                let mut work = lock(&self.work);
                loop {
                    if work.done {
                        return stats;
                    }
                    if work.list.is_empty() && work.active == 0 {
                        work.done = true;
                        self.ready.notify_all();
                        return stats;
                    }
                    if let Some(reason) = self.poll(work.started) {
                        self.halt(&mut work, reason);
                        return stats;
                    }
                    if let Some(node) = work.list.pop() {
                        work.active += 1;
                        work.started += 1;
                        break node;
                    }
                    work = self
                        .ready
                        .wait(work)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };

            let children = self.process(node, &mut stats);
            let mut work = lock(&self.work);
            for child in children {
                work.list.push(child);
            }
            work.active -= 1;
            self.ready.notify_all();
        }
    }

    fn explore(&self) -> BncStats {
        #[cfg(feature = "parallel")]
        if self.config.num_workers > 1 {
            let totals = Mutex::new(BncStats::default());
            rayon::scope(|s| {
                for _ in 0..self.config.num_workers {
                    s.spawn(|_| {
                        let stats = self.worker();
                        lock(&totals).merge(&stats);
                    });
                }
            });
            return totals.into_inner().unwrap_or_else(PoisonError::into_inner);
        }
        self.worker()
    }
}

/// Branch-and-cut runner.
pub struct BncRunner;

impl BncRunner {
    /// Solves `instance` to optimality unless a limit fires first.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_tsp::bnc::{BncConfig, BncRunner, BncStopReason};
    /// use u_tsp::graph::Instance;
    ///
    /// let inst = Instance::new(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
    ///                          &[1, 3, 4, 5, 2, 6]).unwrap();
    /// let result = BncRunner::run(&inst, &BncConfig::default(), None).unwrap();
    /// assert_eq!(result.reason, BncStopReason::Optimal);
    /// assert_eq!(result.cost, Some(12));
    /// ```
    pub fn run(instance: &Instance, config: &BncConfig, start: Option<&Tour>) -> Result<BncResult> {
        Self::run_with_cancel(instance, config, start, None)
    }

    /// Runs branch-and-cut with an optional cancellation token, checked
    /// before every node and between cutting rounds.
    pub fn run_with_cancel(
        instance: &Instance,
        config: &BncConfig,
        start: Option<&Tour>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<BncResult> {
        config.validate().map_err(TspError::invalid_config)?;
        let n = instance.node_count();
        if let Some(tour) = start {
            if tour.len() != n {
                return Err(TspError::invalid_instance(format!(
                    "start tour has {} nodes, expected {n}",
                    tour.len()
                )));
            }
        }
        let costs = PenalizedCosts::new(instance)?;
        let clock = Clock {
            start: Instant::now(),
            limit: config.time_limit,
            cancel,
        };

        if instance.has_degree_deficit() {
            log::debug!("bnc: node with degree below two, no tour exists");
            return Ok(BncResult {
                tour: None,
                cost: None,
                lower_bound: None,
                reason: BncStopReason::Infeasible,
                feasible: false,
                stats: BncStats::default(),
            });
        }
        if n <= 3 {
            // A single cyclic tour exists.
            let tour = Tour::from_permutation((0..n).collect());
            let cost = tour.cost(instance);
            return Ok(BncResult {
                feasible: cost.is_some(),
                lower_bound: cost.map(|c| c as f64),
                reason: if cost.is_some() {
                    BncStopReason::Optimal
                } else {
                    BncStopReason::Infeasible
                },
                tour: cost.map(|_| tour),
                cost,
                stats: BncStats::default(),
            });
        }

        let mut sorted_edges: Vec<EdgeId> = (0..instance.edge_count()).collect();
        sorted_edges.sort_by_key(|&e| (instance.edge(e).cost, e));

        let search = Search {
            instance,
            config,
            costs,
            sorted_edges,
            clock,
            incumbent: SharedIncumbent::new(),
            pool: Mutex::new(CutPool::default()),
            work: Mutex::new(WorkState {
                list: WorkList::new(config.node_selection),
                active: 0,
                started: 0,
                done: false,
            }),
            ready: Condvar::new(),
            reason: Mutex::new(None),
            halted: AtomicBool::new(false),
        };

        if let Some(tour) = start {
            match tour.cost(instance) {
                Some(cost) => search.offer(tour, cost, "start"),
                None => log::debug!("bnc: start tour uses missing edges, not installed"),
            }
        }
        if config.initial_heuristic && !search.interrupted() {
            let lk = search.heuristic_config(config.heuristic_share, None);
            search.run_heuristic(&lk, start, "warm-start");
        }

        lock(&search.work).list.push(SearchNode::root());
        let stats = search.explore();

        let best = search.incumbent.snapshot();
        let reason = lock(&search.reason).unwrap_or(if best.is_some() {
            BncStopReason::Optimal
        } else {
            BncStopReason::Infeasible
        });
        let best_cost = best.as_ref().map(|(_, c)| *c as f64);
        let lower_bound = match reason {
            BncStopReason::Optimal => best_cost,
            BncStopReason::Infeasible => None,
            _ => match lock(&search.work).list.min_bound() {
                Some(open) if open.is_finite() => {
                    Some(best_cost.map_or(open, |c| open.min(c)))
                }
                Some(_) => None,
                None => best_cost,
            },
        };

        let (tour, cost) = match best {
            Some((tour, cost)) => (Some(tour), Some(cost)),
            None => (None, None),
        };
        let open = lock(&search.work).list.len();
        log::debug!(
            "bnc: done reason={reason:?} cost={cost:?} bound={lower_bound:?} nodes={} open={open} lp_solves={} lp_failures={} cuts={} elapsed_ms={}",
            stats.nodes_explored,
            stats.lp_solves,
            stats.lp_failures,
            stats.cuts_added,
            search.clock.start.elapsed().as_millis()
        );

        Ok(BncResult {
            feasible: tour.is_some(),
            tour,
            cost,
            lower_bound,
            reason,
            stats,
        })
    }
}
