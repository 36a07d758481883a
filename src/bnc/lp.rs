//! Node LP on top of `microlp`.
//!
//! One column per instance edge with bounds `[0, 1]`, a degree row
//! `x(δ(v)) = 2` per node and a `≥` row per cut. A node's LP is built with
//! its inherited cuts, solved, and then tightened in place: branching
//! fixings go through [`Solution::fix_var`] and new cuts through
//! [`Solution::add_constraint`], both of which re-optimize from the
//! current basis.
//!
//! [`NodeLp::rebuild`] is the cold path used after the solver reports an
//! internal failure: a fresh problem with the fixings written as variable
//! bounds, solved from scratch.

use super::cut::Cut;
use crate::graph::{EdgeId, Instance};
use microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Solution, Variable};

/// Why an LP operation produced no solution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LpError {
    /// No point satisfies the rows and bounds.
    Infeasible,
    /// The solver gave up; a cold rebuild may still succeed.
    Numerical(String),
}

impl From<microlp::Error> for LpError {
    fn from(err: microlp::Error) -> Self {
        match err {
            microlp::Error::Infeasible => Self::Infeasible,
            // Every column is bounded, so this is a solver fault.
            microlp::Error::Unbounded => Self::Numerical("reported unbounded".into()),
            microlp::Error::InternalError(msg) => Self::Numerical(msg),
        }
    }
}

/// Row of `cut` over all instance edges; `None` if no edge crosses it.
fn cut_row(instance: &Instance, vars: &[Variable], cut: &Cut) -> Option<LinearExpr> {
    let mut row = LinearExpr::empty();
    let mut any = false;
    for (e, edge) in instance.edges().iter().enumerate() {
        let a = cut.coefficient(edge.u, edge.v);
        if a > 0.0 {
            row.add(vars[e], a);
            any = true;
        }
    }
    any.then_some(row)
}

fn problem(
    instance: &Instance,
    cuts: &[&Cut],
    bound: impl Fn(EdgeId) -> (f64, f64),
) -> Result<(Problem, Vec<Variable>), LpError> {
    let mut lp = Problem::new(OptimizationDirection::Minimize);
    let vars: Vec<Variable> = instance
        .edges()
        .iter()
        .enumerate()
        .map(|(e, edge)| lp.add_var(edge.cost as f64, bound(e)))
        .collect();
    for v in 0..instance.node_count() {
        let row: LinearExpr = instance
            .neighbors(v)
            .iter()
            .map(|&(_, e)| (vars[e], 1.0))
            .collect();
        lp.add_constraint(row, ComparisonOp::Eq, 2.0);
    }
    for cut in cuts {
        match cut_row(instance, &vars, cut) {
            Some(row) => lp.add_constraint(row, ComparisonOp::Ge, cut.rhs),
            None => return Err(LpError::Infeasible),
        }
    }
    Ok((lp, vars))
}

/// A solved node relaxation.
pub(crate) struct NodeLp {
    vars: Vec<Variable>,
    solution: Solution,
}

impl NodeLp {
    /// Solves the node LP with `cuts`, then applies `fixings` one at a
    /// time on the warm solution.
    pub(crate) fn solve(
        instance: &Instance,
        cuts: &[&Cut],
        fixings: &[(EdgeId, bool)],
    ) -> Result<Self, LpError> {
        fault::check()?;
        let (lp, vars) = problem(instance, cuts, |_| (0.0, 1.0))?;
        let mut solution = lp.solve()?;
        for &(e, value) in fixings {
            solution = solution.fix_var(vars[e], if value { 1.0 } else { 0.0 })?;
        }
        Ok(Self { vars, solution })
    }

    /// Cold solve: fixings become column bounds of a fresh problem.
    pub(crate) fn rebuild(
        instance: &Instance,
        cuts: &[&Cut],
        fixings: &[(EdgeId, bool)],
    ) -> Result<Self, LpError> {
        fault::check()?;
        let mut bounds = vec![(0.0, 1.0); instance.edge_count()];
        for &(e, value) in fixings {
            bounds[e] = if value { (1.0, 1.0) } else { (0.0, 0.0) };
        }
        let (lp, vars) = problem(instance, cuts, |e| bounds[e])?;
        let solution = lp.solve()?;
        Ok(Self { vars, solution })
    }

    /// Adds `cuts` as rows and re-optimizes. Consumes the LP on failure.
    pub(crate) fn add_cuts(self, instance: &Instance, cuts: &[&Cut]) -> Result<Self, LpError> {
        fault::check()?;
        let Self { vars, mut solution } = self;
        for cut in cuts {
            let row = cut_row(instance, &vars, cut).ok_or(LpError::Infeasible)?;
            solution = solution.add_constraint(row, ComparisonOp::Ge, cut.rhs)?;
        }
        Ok(Self { vars, solution })
    }

    pub(crate) fn objective(&self) -> f64 {
        self.solution.objective()
    }

    /// Edges with value above `eps`, clamped to `[0, 1]`.
    pub(crate) fn point(&self, eps: f64) -> Vec<(EdgeId, f64)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(e, &var)| (e, self.solution[var].clamp(0.0, 1.0)))
            .filter(|&(_, x)| x > eps)
            .collect()
    }
}


#[cfg(not(test))]
mod fault {
    use super::LpError;

    #[inline(always)]
    pub(super) fn check() -> Result<(), LpError> {
        Ok(())
    }
}
