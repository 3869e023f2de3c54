//! Bounds propagation over integer domains.
//!
//! Every variable carries an interval domain `[lo, hi]`. Each constraint
//! kind has a propagator that tightens the bounds of its variables until
//! no further reduction is possible or a domain becomes empty.
//!
//! Propagation is bounds-consistent for linear constraints and sound (but
//! not complete) for the non-linear equalities; completeness is recovered
//! at the leaves of the search, where every variable is fixed and the
//! forward direction of each propagator becomes an exact check.
//!
//! # References
//!
//! - Apt (2003), "Principles of Constraint Programming", ch. 6
//! - Schulte & Stuckey (2008), "Efficient constraint propagation engines"

use std::collections::VecDeque;

use super::expr::LinearExpr;
use super::model::{Comparison, Constraint, CpModel};

/// A domain wipe-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Conflict;

pub(crate) type PropResult = Result<(), Conflict>;

/// Interval domains for every model variable.
#[derive(Debug, Clone)]
pub(crate) struct Domains {
    lo: Vec<i64>,
    hi: Vec<i64>,
}

impl Domains {
    pub(crate) fn from_model(model: &CpModel) -> Self {
        Self {
            lo: model.variables.iter().map(|v| v.min).collect(),
            hi: model.variables.iter().map(|v| v.max).collect(),
        }
    }

    #[inline]
    pub(crate) fn lo(&self, var: usize) -> i64 {
        self.lo[var]
    }

    #[inline]
    pub(crate) fn hi(&self, var: usize) -> i64 {
        self.hi[var]
    }

    #[inline]
    pub(crate) fn is_fixed(&self, var: usize) -> bool {
        self.lo[var] == self.hi[var]
    }

    /// Raises the lower bound of `var`; records `var` in `changed` on change.
    pub(crate) fn tighten_lo(
        &mut self,
        var: usize,
        value: i64,
        changed: &mut Vec<usize>,
    ) -> PropResult {
        if value > self.hi[var] {
            return Err(Conflict);
        }
        if value > self.lo[var] {
            self.lo[var] = value;
            changed.push(var);
        }
        Ok(())
    }

    /// Lowers the upper bound of `var`; records `var` in `changed` on change.
    pub(crate) fn tighten_hi(
        &mut self,
        var: usize,
        value: i64,
        changed: &mut Vec<usize>,
    ) -> PropResult {
        if value < self.lo[var] {
            return Err(Conflict);
        }
        if value < self.hi[var] {
            self.hi[var] = value;
            changed.push(var);
        }
        Ok(())
    }

    /// Lower bounds as a dense assignment. Meaningful once all vars are fixed.
    pub(crate) fn values(&self) -> Vec<i64> {
        self.lo.clone()
    }
}

fn floor_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}

fn term_min(coef: i64, lo: i64, hi: i64) -> i128 {
    let (a, b) = (coef as i128 * lo as i128, coef as i128 * hi as i128);
    a.min(b)
}

fn term_max(coef: i64, lo: i64, hi: i64) -> i128 {
    let (a, b) = (coef as i128 * lo as i128, coef as i128 * hi as i128);
    a.max(b)
}

/// Clamps an i128 bound into i64 range; out-of-range bounds never bind.
fn clamp(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// `sum(terms) <= rhs`.
fn propagate_le(
    terms: &[(super::VarId, i64)],
    rhs: i128,
    dom: &mut Domains,
    changed: &mut Vec<usize>,
) -> PropResult {
    let min_sum: i128 = terms
        .iter()
        .map(|&(v, a)| term_min(a, dom.lo(v.index()), dom.hi(v.index())))
        .sum();
    if min_sum > rhs {
        return Err(Conflict);
    }
    for &(v, a) in terms {
        if a == 0 {
            continue;
        }
        let x = v.index();
        let slack = rhs - (min_sum - term_min(a, dom.lo(x), dom.hi(x)));
        if a > 0 {
            dom.tighten_hi(x, clamp(floor_div(slack, a as i128)), changed)?;
        } else {
            dom.tighten_lo(x, clamp(ceil_div(slack, a as i128)), changed)?;
        }
    }
    Ok(())
}

/// `sum(terms) >= rhs`.
fn propagate_ge(
    terms: &[(super::VarId, i64)],
    rhs: i128,
    dom: &mut Domains,
    changed: &mut Vec<usize>,
) -> PropResult {
    let max_sum: i128 = terms
        .iter()
        .map(|&(v, a)| term_max(a, dom.lo(v.index()), dom.hi(v.index())))
        .sum();
    if max_sum < rhs {
        return Err(Conflict);
    }
    for &(v, a) in terms {
        if a == 0 {
            continue;
        }
        let x = v.index();
        let slack = rhs - (max_sum - term_max(a, dom.lo(x), dom.hi(x)));
        if a > 0 {
            dom.tighten_lo(x, clamp(ceil_div(slack, a as i128)), changed)?;
        } else {
            dom.tighten_hi(x, clamp(floor_div(slack, a as i128)), changed)?;
        }
    }
    Ok(())
}

pub(crate) fn propagate_linear(
    expr: &LinearExpr,
    cmp: Comparison,
    rhs: i64,
    dom: &mut Domains,
    changed: &mut Vec<usize>,
) -> PropResult {
    let rhs = rhs as i128 - expr.constant as i128;
    if matches!(cmp, Comparison::Le | Comparison::Eq) {
        propagate_le(&expr.terms, rhs, dom, changed)?;
    }
    if matches!(cmp, Comparison::Ge | Comparison::Eq) {
        propagate_ge(&expr.terms, rhs, dom, changed)?;
    }
    Ok(())
}

fn propagate_abs(target: usize, var: usize, dom: &mut Domains, changed: &mut Vec<usize>) -> PropResult {
    let (xl, xh) = (dom.lo(var), dom.hi(var));
    let (tl, th) = if xl >= 0 {
        (xl, xh)
    } else if xh <= 0 {
        (-xh, -xl)
    } else {
        (0, (-xl).max(xh))
    };
    dom.tighten_lo(target, tl, changed)?;
    dom.tighten_hi(target, th, changed)?;

    let (tl, th) = (dom.lo(target), dom.hi(target));
    dom.tighten_lo(var, -th, changed)?;
    dom.tighten_hi(var, th, changed)?;
    if tl > 0 {
        // |x| >= tl removes the open band (-tl, tl).
        if dom.lo(var) > -tl {
            dom.tighten_lo(var, tl, changed)?;
        }
        if dom.hi(var) < tl {
            dom.tighten_hi(var, -tl, changed)?;
        }
    }
    Ok(())
}

fn interval_mul(a: (i128, i128), b: (i128, i128)) -> (i128, i128) {
    let corners = [a.0 * b.0, a.0 * b.1, a.1 * b.0, a.1 * b.1];
    let lo = corners.iter().copied().min().unwrap_or(0);
    let hi = corners.iter().copied().max().unwrap_or(0);
    (lo, hi)
}

fn propagate_product(
    target: usize,
    factors: &[super::VarId],
    dom: &mut Domains,
    changed: &mut Vec<usize>,
) -> PropResult {
    let product = factors.iter().fold((1i128, 1i128), |acc, f| {
        let x = f.index();
        interval_mul(acc, (dom.lo(x) as i128, dom.hi(x) as i128))
    });
    dom.tighten_lo(target, clamp(product.0), changed)?;
    dom.tighten_hi(target, clamp(product.1), changed)?;

    // Reverse direction, non-negative factors only.
    if factors.iter().any(|f| dom.lo(f.index()) < 0) {
        return Ok(());
    }
    for (i, f) in factors.iter().enumerate() {
        let (rest_lo, rest_hi) = factors
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .fold((1i128, 1i128), |(lo, hi), (_, g)| {
                (lo * dom.lo(g.index()) as i128, hi * dom.hi(g.index()) as i128)
            });
        let (tl, th) = (dom.lo(target) as i128, dom.hi(target) as i128);
        if rest_lo > 0 {
            dom.tighten_hi(f.index(), clamp(floor_div(th, rest_lo)), changed)?;
        }
        if tl > 0 && rest_hi > 0 {
            dom.tighten_lo(f.index(), clamp(ceil_div(tl, rest_hi)), changed)?;
        }
    }
    Ok(())
}

fn propagate_max(
    target: usize,
    vars: &[super::VarId],
    dom: &mut Domains,
    changed: &mut Vec<usize>,
) -> PropResult {
    let max_lo = vars.iter().map(|v| dom.lo(v.index())).max().unwrap_or(i64::MIN);
    let max_hi = vars.iter().map(|v| dom.hi(v.index())).max().unwrap_or(i64::MIN);
    dom.tighten_lo(target, max_lo, changed)?;
    dom.tighten_hi(target, max_hi, changed)?;

    let (tl, th) = (dom.lo(target), dom.hi(target));
    for v in vars {
        dom.tighten_hi(v.index(), th, changed)?;
    }
    let mut support = vars.iter().filter(|v| dom.hi(v.index()) >= tl);
    match (support.next(), support.next()) {
        (None, _) => return Err(Conflict),
        (Some(only), None) => dom.tighten_lo(only.index(), tl, changed)?,
        _ => {}
    }
    Ok(())
}

/// Runs one constraint's propagator.
pub(crate) fn propagate_constraint(
    constraint: &Constraint,
    dom: &mut Domains,
    changed: &mut Vec<usize>,
) -> PropResult {
    match constraint {
        Constraint::Linear { expr, cmp, rhs } => propagate_linear(expr, *cmp, *rhs, dom, changed),
        Constraint::AbsEquality { target, var } => {
            propagate_abs(target.index(), var.index(), dom, changed)
        }
        Constraint::ProductEquality { target, factors } => {
            propagate_product(target.index(), factors, dom, changed)
        }
        Constraint::MaxEquality { target, vars } => {
            propagate_max(target.index(), vars, dom, changed)
        }
    }
}

/// Fixed-point propagation engine with per-variable watch lists.
///
/// Constraint `constraints.len()` is reserved for the objective cut
/// `objective <= bound` used by branch-and-bound.
pub(crate) struct Propagator<'m> {
    constraints: &'m [Constraint],
    objective: Option<LinearExpr>,
    watches: Vec<Vec<usize>>,
}

impl<'m> Propagator<'m> {
    pub(crate) fn new(model: &'m CpModel, objective: Option<LinearExpr>) -> Self {
        let mut watches = vec![Vec::new(); model.variables.len()];
        for (ci, constraint) in model.constraints.iter().enumerate() {
            for v in constraint.variables() {
                let list: &mut Vec<usize> = &mut watches[v.index()];
                if list.last() != Some(&ci) {
                    list.push(ci);
                }
            }
        }
        if let Some(expr) = &objective {
            let oi = model.constraints.len();
            for &(v, _) in &expr.terms {
                let list: &mut Vec<usize> = &mut watches[v.index()];
                if list.last() != Some(&oi) {
                    list.push(oi);
                }
            }
        }
        Self {
            constraints: &model.constraints,
            objective,
            watches,
        }
    }

    fn objective_index(&self) -> usize {
        self.constraints.len()
    }

    fn slot_count(&self) -> usize {
        self.constraints.len() + 1
    }

    /// Propagates every constraint to a fixed point.
    pub(crate) fn propagate_all(&self, dom: &mut Domains, bound: Option<i64>) -> PropResult {
        self.run(dom, 0..self.slot_count(), bound)
    }

    /// Propagates the constraints watching `var`, plus the objective cut.
    pub(crate) fn propagate_from(
        &self,
        dom: &mut Domains,
        var: usize,
        bound: Option<i64>,
    ) -> PropResult {
        let seeds = self.watches[var]
            .iter()
            .copied()
            .chain(std::iter::once(self.objective_index()));
        self.run(dom, seeds, bound)
    }

    fn run(
        &self,
        dom: &mut Domains,
        seeds: impl IntoIterator<Item = usize>,
        bound: Option<i64>,
    ) -> PropResult {
        let mut queued = vec![false; self.slot_count()];
        let mut queue = VecDeque::new();
        for ci in seeds {
            if !queued[ci] {
                queued[ci] = true;
                queue.push_back(ci);
            }
        }

        let mut changed = Vec::new();
        while let Some(ci) = queue.pop_front() {
            queued[ci] = false;
            changed.clear();
            if ci == self.objective_index() {
                if let (Some(expr), Some(bound)) = (&self.objective, bound) {
                    propagate_linear(expr, Comparison::Le, bound, dom, &mut changed)?;
                }
            } else {
                propagate_constraint(&self.constraints[ci], dom, &mut changed)?;
            }
            for &var in &changed {
                for &watcher in &self.watches[var] {
                    if !queued[watcher] {
                        queued[watcher] = true;
                        queue.push_back(watcher);
                    }
                }
            }
        }
        Ok(())
    }
}
