//! Node relaxation: LP solve and the cutting loop.
//!
//! Every instance edge is an LP column, so each optimal LP value is a
//! valid lower bound for the node without any pricing step. The loop
//! separates the current point, adds the violated cuts to the warm LP and
//! re-solves until no cut is found or the round cap is reached. A solver
//! failure triggers a cold rebuild of the LP, at most `lp_retries` times
//! per node.

use super::config::BncConfig;
use super::cut::{Cut, CutId, CutKind, CutPool, SupportEdge};
use super::incumbent::SharedIncumbent;
use super::lp::{LpError, NodeLp};
use super::separation;
use super::tree::SearchNode;
use super::types::BncStats;
use crate::graph::{Cost, EdgeId, Instance};
use std::sync::{Arc, Mutex, PoisonError};

/// Pool cuts re-checked per round.
const POOL_BATCH: usize = 50;

/// Shared state a worker needs to solve one node.
pub(crate) struct NodeContext<'a> {
    pub(crate) instance: &'a Instance,
    pub(crate) config: &'a BncConfig,
    pub(crate) pool: &'a Mutex<CutPool>,
    pub(crate) incumbent: &'a SharedIncumbent,
    pub(crate) interrupted: &'a (dyn Fn() -> bool + Sync),
}

/// Outcome of solving one node's relaxation.
#[derive(Debug)]
pub(crate) enum Relaxation {
    /// Cut loop finished. `point` holds the edges with value above the
    /// integrality tolerance.
    Solved {
        bound: f64,
        point: Vec<(EdgeId, f64)>,
        cuts: Vec<CutId>,
    },
    /// The bound reached the incumbent.
    Dominated { bound: f64 },
    /// No tour satisfies the node's fixings and cuts.
    Infeasible,
    /// The LP failed on every retry.
    Failed,
    /// A stop condition fired between rounds.
    Interrupted,
}

/// Whether a node with LP bound `bound` cannot beat `upper`.
pub(crate) fn dominated(bound: f64, upper: Cost, eps: f64) -> bool {
    if upper == i64::MAX {
        return false;
    }
    let slack = eps + 1e-9 * bound.abs();
    (bound - slack).ceil() >= upper as f64
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn pooled(pool: &Mutex<CutPool>, ids: &[CutId]) -> Vec<Arc<Cut>> {
    let pool = lock(pool);
    ids.iter().map(|&id| pool.get(id)).collect()
}

fn refs(cuts: &[Arc<Cut>]) -> Vec<&Cut> {
    cuts.iter().map(Arc::as_ref).collect()
}

/// Fresh cuts for a support point: components first, then minimum cuts
/// and combs for fractional points.
fn separate(n: usize, support: &[SupportEdge], eps: f64, integral: bool) -> Vec<Cut> {
    let cuts = separation::component_cuts(n, support);
    if !cuts.is_empty() || integral {
        return cuts;
    }
    let (_, mut cuts) = separation::min_cut_subtours(n, support, eps);
    cuts.extend(separation::combs(n, support, eps));
    cuts
}

/// Solves the relaxation of `node`, adding cuts until the point is
/// cut-exhausted or `max_cut_rounds` is reached.
pub(crate) fn solve_node(
    ctx: &NodeContext<'_>,
    node: &SearchNode,
    stats: &mut BncStats,
) -> Relaxation {
    let instance = ctx.instance;
    let n = instance.node_count();
    let eps = ctx.config.integrality_tol;
    if (ctx.interrupted)() {
        return Relaxation::Interrupted;
    }

    let mut active: Vec<CutId> = node.cuts.clone();
    let mut age: Vec<usize> = vec![0; active.len()];
    let mut retries = ctx.config.lp_retries;
    let mut rounds = 0usize;

    stats.lp_solves += 1;
    let mut lp = NodeLp::solve(instance, &refs(&pooled(ctx.pool, &active)), &node.fixings);

    loop {
        let current = match lp {
            Ok(current) => current,
            Err(LpError::Infeasible) => return Relaxation::Infeasible,
            Err(LpError::Numerical(msg)) => {
                stats.lp_failures += 1;
                if retries == 0 {
                    log::debug!(
                        "bnc: lp failed depth={} cuts={} error={msg}, giving up",
                        node.depth,
                        active.len()
                    );
                    return Relaxation::Failed;
                }
                retries -= 1;
                log::debug!(
                    "bnc: lp failed depth={} cuts={} error={msg}, rebuilding",
                    node.depth,
                    active.len()
                );
                if (ctx.interrupted)() {
                    return Relaxation::Interrupted;
                }
                stats.lp_solves += 1;
                let cuts = pooled(ctx.pool, &active);
                lp = NodeLp::rebuild(instance, &refs(&cuts), &node.fixings);
                continue;
            }
        };

        let bound = current.objective().max(node.bound);
        if dominated(bound, ctx.incumbent.upper_bound(), eps) {
            return Relaxation::Dominated { bound };
        }

        let point = current.point(eps);
        let support: Vec<SupportEdge> = point
            .iter()
            .map(|&(e, x)| {
                let edge = instance.edge(e);
                (edge.u, edge.v, x)
            })
            .collect();
        let integral = point.iter().all(|&(_, x)| x >= 1.0 - eps);

        let cuts = pooled(ctx.pool, &active);
        for (cut, a) in cuts.iter().zip(age.iter_mut()) {
            if cut.activity(&support) > cut.rhs + eps {
                *a += 1;
            } else {
                *a = 0;
            }
        }

        // Integral points keep cutting past the round cap: component cuts
        // are exact for them and each round removes a subtour.
        if rounds >= ctx.config.max_cut_rounds && !integral {
            return Relaxation::Solved {
                bound,
                point,
                cuts: active,
            };
        }

        let mut fresh: Vec<CutId> = lock(ctx.pool).violated(&support, &active, eps, POOL_BATCH);
        if fresh.is_empty() {
            let found = separate(n, &support, eps, integral);
            let mut pool = lock(ctx.pool);
            for cut in found {
                let id = pool.insert(cut);
                if !active.contains(&id) && !fresh.contains(&id) {
                    fresh.push(id);
                }
            }
        }
        if fresh.is_empty() {
            return Relaxation::Solved {
                bound,
                point,
                cuts: active,
            };
        }

        rounds += 1;
        let added = pooled(ctx.pool, &fresh);
        stats.cuts_added += added.len();
        log::trace!(
            "bnc: round={rounds} depth={} bound={bound:.3} subtours={} combs={}",
            node.depth,
            added.iter().filter(|c| c.kind == CutKind::Subtour).count(),
            added.iter().filter(|c| c.kind == CutKind::Comb).count()
        );

        // Slack cuts stay in this LP but are not handed to children or to
        // a rebuild.
        let limit = ctx.config.cut_age_limit;
        let mut kept = Vec::with_capacity(active.len() + fresh.len());
        let mut kept_age = Vec::with_capacity(active.len() + fresh.len());
        for (&id, &a) in active.iter().zip(&age) {
            // Integral points only ever gain cuts, so the loop past the
            // round cap cannot revisit a subtour.
            if integral || a < limit {
                kept.push(id);
                kept_age.push(a);
            }
        }
        kept_age.extend(std::iter::repeat(0).take(fresh.len()));
        kept.extend(fresh);
        active = kept;
        age = kept_age;

        if (ctx.interrupted)() {
            return Relaxation::Interrupted;
        }
        stats.lp_solves += 1;
        lp = current.add_cuts(instance, &refs(&added));
    }
}

#[cfg(test)]
mod tests {
    use super::super::lp::fault;
    use super::*;

    fn complete(n: usize, cost: impl Fn(usize, usize) -> Cost) -> Instance {
        let mut edges = Vec::new();
        let mut costs = Vec::new();
        for u in 0..n {
            for v in u + 1..n {
                edges.push((u, v));
                costs.push(cost(u, v));
            }
        }
        Instance::new(n, &edges, &costs).unwrap()
    }

    fn solve(
        instance: &Instance,
        config: &BncConfig,
        node: &SearchNode,
        interrupted: &(dyn Fn() -> bool + Sync),
    ) -> (Relaxation, BncStats) {
        let pool = Mutex::new(CutPool::default());
        let incumbent = SharedIncumbent::new();
        let ctx = NodeContext {
            instance,
            config,
            pool: &pool,
            incumbent: &incumbent,
            interrupted,
        };
        let mut stats = BncStats::default();
        let relax = solve_node(&ctx, node, &mut stats);
        (relax, stats)
    }

    fn run_root(instance: &Instance, config: &BncConfig) -> (Relaxation, BncStats) {
        solve(instance, config, &SearchNode::root(), &|| false)
    }

    #[test]
    fn test_dominated() {
        assert!(!dominated(100.0, i64::MAX, 1e-6));
        assert!(dominated(12.0, 12, 1e-6));
        assert!(dominated(11.2, 12, 1e-6));
        assert!(!dominated(11.0, 12, 1e-6));
        assert!(!dominated(11.0000001, 12, 1e-6));
    }

    #[test]
    fn test_two_clusters_need_subtour_cuts() {
        // Two tight triangles far apart: the degree LP alone picks both
        // triangles, the subtour cut forces two bridges.
        let cluster = |v: usize| v / 3;
        let inst = complete(6, |u, v| if cluster(u) == cluster(v) { 1 } else { 10 });
        let (relax, stats) = run_root(&inst, &BncConfig::default());
        match relax {
            Relaxation::Solved { bound, cuts, .. } => {
                assert!((bound - 24.0).abs() < 1e-6);
                assert!(!cuts.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(stats.cuts_added >= 1);
        assert!(stats.lp_solves >= 2);
        assert_eq!(stats.lp_failures, 0);
    }

    fn brute_force(inst: &Instance) -> Cost {
        fn go(inst: &Instance, path: &mut Vec<usize>, used: &mut [bool], acc: Cost, best: &mut Cost) {
            let n = inst.node_count();
            let last = path[path.len() - 1];
            if path.len() == n {
                *best = (*best).min(acc + inst.cost_of(last, 0).unwrap());
                return;
            }
            for v in 1..n {
                if !used[v] {
                    used[v] = true;
                    path.push(v);
                    go(inst, path, used, acc + inst.cost_of(last, v).unwrap(), best);
                    path.pop();
                    used[v] = false;
                }
            }
        }
        let mut best = Cost::MAX;
        let mut used = vec![false; inst.node_count()];
        used[0] = true;
        go(inst, &mut vec![0], &mut used, 0, &mut best);
        best
    }

    #[test]
    fn test_root_bound_is_valid() {
        let inst = complete(7, |u, v| {
            (u as Cost - v as Cost).abs() * 3 + ((u + v) % 4) as Cost
        });
        let (relax, _) = run_root(&inst, &BncConfig::default());
        let opt = brute_force(&inst) as f64;
        match relax {
            Relaxation::Solved { bound, point, .. } => {
                assert!(bound <= opt + 1e-6, "bound {bound} above optimum {opt}");
                assert!(!point.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_infeasible_fixings() {
        // Three edges at node 0 forced in violate the degree row.
        let inst = complete(5, |_, _| 1);
        let mut node = SearchNode::root();
        for v in 1..4 {
            node.fixings.push((inst.edge_between(0, v).unwrap(), true));
        }
        let (relax, _) = solve(&inst, &BncConfig::default(), &node, &|| false);
        assert!(matches!(relax, Relaxation::Infeasible));
    }

    #[test]
    fn test_interrupt_is_checked_first() {
        let inst = complete(5, |_, _| 1);
        let (relax, stats) = solve(&inst, &BncConfig::default(), &SearchNode::root(), &|| true);
        assert!(matches!(relax, Relaxation::Interrupted));
        assert_eq!(stats.lp_solves, 0);
    }

    #[test]
    fn test_solver_failure_is_retried() {
        let cluster = |v: usize| v / 3;
        let inst = complete(6, |u, v| if cluster(u) == cluster(v) { 1 } else { 10 });
        fault::inject(1);
        let (relax, stats) = run_root(&inst, &BncConfig::default().with_lp_retries(2));
        match relax {
            Relaxation::Solved { bound, .. } => assert!((bound - 24.0).abs() < 1e-6),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(stats.lp_failures, 1);
        // The failed attempt and the rebuild both count as solves.
        assert!(stats.lp_solves >= 3);
    }

    #[test]
    fn test_failure_after_retries_spent() {
        let inst = complete(6, |u, v| (u + v) as Cost);
        fault::inject(3);
        let (relax, stats) = run_root(&inst, &BncConfig::default().with_lp_retries(2));
        assert!(matches!(relax, Relaxation::Failed));
        assert_eq!(stats.lp_solves, 3);
        assert_eq!(stats.lp_failures, 3);
    }

    #[test]
    fn test_no_retries_fails_at_once() {
        let inst = complete(5, |_, _| 1);
        fault::inject(1);
        let (relax, stats) = run_root(&inst, &BncConfig::default().with_lp_retries(0));
        assert!(matches!(relax, Relaxation::Failed));
        assert_eq!(stats.lp_solves, 1);
        assert_eq!(stats.lp_failures, 1);
    }
}
