//! Bundled branch-and-bound CP solver.
//!
//! # Algorithm
//!
//! 1. Propagate all constraints at the root
//! 2. Depth-first search: pick the first unfixed variable (booleans before
//!    integers), branch on its value, propagate the constraints that watch it
//! 3. On a leaf (all variables fixed) record the solution and post the cut
//!    `objective <= best - 1`
//! 4. Stop when the tree is exhausted (proof of optimality or infeasibility)
//!    or the time budget runs out
//!
//! Several workers may search the same tree with different branching orders,
//! sharing the incumbent so each one prunes with the best value found so far.
//!
//! # Reference
//!
//! Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems".
//! Van Hentenryck (1989), "Constraint Satisfaction in Logic Programming", ch. 4.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use super::expr::LinearExpr;
use super::model::CpModel;
use super::propagate::{Domains, Propagator};
use super::solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
use super::variables::VarKind;

const NO_INCUMBENT: i64 = i64::MAX;

/// Best solution shared between workers.
struct Incumbent {
    value: AtomicI64,
    values: Mutex<Option<Vec<i64>>>,
}

impl Incumbent {
    fn new() -> Self {
        Self {
            value: AtomicI64::new(NO_INCUMBENT),
            values: Mutex::new(None),
        }
    }

    /// The cut to post: strictly better than the incumbent.
    fn bound(&self) -> Option<i64> {
        match self.value.load(Ordering::Acquire) {
            NO_INCUMBENT => None,
            v => Some(v - 1),
        }
    }

    fn offer(&self, value: i64, values: Vec<i64>) {
        let mut guard = match self.values.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.is_none() || value < self.value.load(Ordering::Acquire) {
            *guard = Some(values);
            self.value.store(value, Ordering::Release);
        }
    }

    fn take(self) -> Option<(i64, Vec<i64>)> {
        let value = self.value.load(Ordering::Acquire);
        let values = match self.values.into_inner() {
            Ok(v) => v,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.map(|v| (value, v))
    }
}

/// A pending subtree: parent domains plus the decision `lo <= var <= hi` to apply.
type Node = (Domains, Option<(usize, i64, i64)>);

/// Shared, read-only search context.
struct Search<'m> {
    model: &'m CpModel,
    propagator: Propagator<'m>,
    objective: Option<LinearExpr>,
    /// Net objective coefficient per variable (minimization form).
    weights: Vec<i64>,
    deadline: Instant,
    stop_after_first: bool,
    incumbent: Incumbent,
    finished: AtomicBool,
    nodes: AtomicU64,
}

/// How a worker's search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerEnd {
    /// The whole tree was explored.
    Exhausted,
    /// Budget expired, another worker finished, or stop-after-first fired.
    Interrupted,
}

impl<'m> Search<'m> {
    fn new(model: &'m CpModel, config: &SolverConfig, start: Instant) -> Self {
        let objective = model.objective.as_ref().map(|o| o.as_minimization());
        let mut weights = vec![0; model.variables.len()];
        if let Some(expr) = &objective {
            for &(v, c) in &expr.terms {
                weights[v.index()] += c;
            }
        }
        Self {
            model,
            propagator: Propagator::new(model, objective.clone()),
            objective,
            weights,
            deadline: start + Duration::from_millis(config.time_limit_ms.max(0) as u64),
            stop_after_first: config.stop_after_first || model.objective.is_none(),
            incumbent: Incumbent::new(),
            finished: AtomicBool::new(false),
            nodes: AtomicU64::new(0),
        }
    }

    /// Branching order for a worker: booleans first, integers after.
    ///
    /// Worker 0 keeps declaration order; the others shuffle the booleans.
    fn branching_order(&self, worker: usize, seed: u64) -> Vec<usize> {
        let (mut bools, ints): (Vec<usize>, Vec<usize>) = (0..self.model.variables.len())
            .partition(|&i| self.model.variables[i].kind == VarKind::Bool);
        if worker > 0 {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));
            bools.shuffle(&mut rng);
        }
        bools.extend(ints);
        bools
    }

    /// Preferred first value for a boolean: follow the sign of its objective weight.
    fn prefers_true(&self, var: usize) -> bool {
        self.weights[var] <= 0
    }

    fn interrupted(&self) -> bool {
        self.finished.load(Ordering::Acquire) || Instant::now() >= self.deadline
    }

    fn run_worker(&self, worker: usize, seed: u64) -> WorkerEnd {
        if self.interrupted() {
            return WorkerEnd::Interrupted;
        }
        let order = self.branching_order(worker, seed);
        let mut root = Domains::from_model(self.model);
        if self
            .propagator
            .propagate_all(&mut root, self.incumbent.bound())
            .is_err()
        {
            self.finished.store(true, Ordering::Release);
            return WorkerEnd::Exhausted;
        }

        let mut stack: Vec<Node> = vec![(root, None)];
        let mut explored: u64 = 0;

        let end = loop {
            let Some((domains, decision)) = stack.pop() else {
                break WorkerEnd::Exhausted;
            };
            explored += 1;
            if explored % 64 == 0 && self.interrupted() {
                break WorkerEnd::Interrupted;
            }

            let domains = match decision {
                Some((var, lo, hi)) => {
                    match self.apply(domains, var, lo, hi, self.incumbent.bound()) {
                        Some(d) => d,
                        None => continue,
                    }
                }
                None => domains,
            };

            let Some(&var) = order.iter().find(|&&v| !domains.is_fixed(v)) else {
                let values = domains.values();
                debug_assert!(self.model.is_satisfied_by(&values));
                let value = self
                    .objective
                    .as_ref()
                    .map(|e| e.evaluate(&values))
                    .unwrap_or(0);
                self.incumbent.offer(value, values);
                if self.stop_after_first {
                    break WorkerEnd::Interrupted;
                }
                continue;
            };

            let (lo, hi) = (domains.lo(var), domains.hi(var));
            let (first, second) = if self.model.variables[var].kind == VarKind::Bool {
                if self.prefers_true(var) {
                    ((1, 1), (0, 0))
                } else {
                    ((0, 0), (1, 1))
                }
            } else {
                ((lo, lo), (lo + 1, hi))
            };
            stack.push((domains.clone(), Some((var, second.0, second.1))));
            stack.push((domains, Some((var, first.0, first.1))));
        };

        self.nodes.fetch_add(explored, Ordering::Relaxed);
        if end == WorkerEnd::Exhausted {
            self.finished.store(true, Ordering::Release);
        }
        end
    }

    /// Applies a branching decision and propagates. `None` on conflict.
    fn apply(
        &self,
        mut domains: Domains,
        var: usize,
        lo: i64,
        hi: i64,
        bound: Option<i64>,
    ) -> Option<Domains> {
        let mut changed = Vec::new();
        domains.tighten_lo(var, lo, &mut changed).ok()?;
        domains.tighten_hi(var, hi, &mut changed).ok()?;
        self.propagator
            .propagate_from(&mut domains, var, bound)
            .ok()?;
        Some(domains)
    }
}

/// Depth-first branch-and-bound solver with bounds propagation.
///
/// Handles every [`Constraint`](super::Constraint) kind. Exact on small and
/// medium models; on large models it returns the best solution found within
/// the time budget with [`SolverStatus::Feasible`].
///
/// # Examples
///
/// ```
/// use u_rota::cp::{BranchAndBoundSolver, CpModel, CpSolver, LinearExpr, SolverConfig, SolverStatus};
///
/// let mut model = CpModel::new("pick-one");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_eq(LinearExpr::sum([a, b]), 1);
/// model.minimize(LinearExpr::new().term(a, 5).term(b, 2));
///
/// let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(solution.status, SolverStatus::Optimal);
/// assert_eq!(solution.objective_value, Some(2));
/// assert!(solution.is_true(b));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        if let Err(reason) = model.validate() {
            warn!(model = %model.name, %reason, "invalid CP model");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }
        if let Err(reason) = config.validate() {
            warn!(%reason, "invalid solver configuration");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let start = Instant::now();
        let search = Search::new(model, config, start);
        let seed = config.seed.unwrap_or(42);
        debug!(
            model = %model.name,
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            workers = config.num_workers,
            "starting branch-and-bound"
        );

        #[cfg(feature = "parallel")]
        let ends: Vec<WorkerEnd> = (0..config.num_workers)
            .into_par_iter()
            .map(|w| search.run_worker(w, seed))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let ends: Vec<WorkerEnd> = (0..config.num_workers)
            .map(|w| search.run_worker(w, seed))
            .collect();

        let exhausted = ends.contains(&WorkerEnd::Exhausted);
        let nodes = search.nodes.load(Ordering::Relaxed);
        let best = search.incumbent.take();

        let status = match (&best, exhausted) {
            (Some(_), true) => SolverStatus::Optimal,
            (None, true) => SolverStatus::Infeasible,
            (Some(_), false) if model.objective.is_none() => SolverStatus::Optimal,
            (Some(_), false) => SolverStatus::Feasible,
            (None, false) => SolverStatus::Timeout,
        };

        let mut solution = CpSolution::empty(status);
        solution.nodes = nodes;
        solution.solve_time_ms = start.elapsed().as_millis() as i64;
        if let Some((_, values)) = best {
            solution.objective_value = model.objective.as_ref().map(|o| o.expr().evaluate(&values));
            solution.values = values;
        }
        debug!(?status, nodes, elapsed_ms = solution.solve_time_ms, "search finished");
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{Comparison, LinearExpr};

    fn quick() -> SolverConfig {
        SolverConfig::default().with_time_limit_ms(10_000)
    }

    #[test]
    fn test_minimize_pick_cheapest() {
        let mut model = CpModel::new("test");
        let vars: Vec<_> = (0..4).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        model.add_eq(LinearExpr::sum(vars.iter().copied()), 2);
        model.minimize(
            vars.iter()
                .zip([7, 3, 5, 4])
                .map(|(&v, c)| (v, c))
                .collect(),
        );

        let solution = BranchAndBoundSolver::new().solve(&model, &quick());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(7));
        assert!(solution.is_true(vars[1]));
        assert!(solution.is_true(vars[3]));
        assert!(model.is_satisfied_by(&solution.values));
    }

    #[test]
    fn test_maximize() {
        let mut model = CpModel::new("test");
        let vars: Vec<_> = (0..3).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        model.add_le(LinearExpr::sum(vars.iter().copied()), 2);
        model.maximize(LinearExpr::sum(vars.iter().copied()));

        let solution = BranchAndBoundSolver::new().solve(&model, &quick());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(2));
    }

    #[test]
    fn test_infeasible() {
        let mut model = CpModel::new("test");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        model.add_eq(LinearExpr::sum([a, b]), 2);
        model.add_le(LinearExpr::from(a), 0);

        let solution = BranchAndBoundSolver::new().solve(&model, &quick());
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(solution.values.is_empty());
        assert!(solution.objective_value.is_none());
    }

    #[test]
    fn test_infeasible_needs_search() {
        // Pigeonhole: 3 pigeons, 2 holes.
        let mut model = CpModel::new("pigeons");
        let x: Vec<Vec<_>> = (0..3)
            .map(|p| (0..2).map(|h| model.new_bool_var(format!("p{p}h{h}"))).collect())
            .collect();
        for row in &x {
            model.add_eq(LinearExpr::sum(row.iter().copied()), 1);
        }
        for h in 0..2 {
            model.add_le(LinearExpr::sum(x.iter().map(|row| row[h])), 1);
        }

        let solution = BranchAndBoundSolver::new().solve(&model, &quick());
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(solution.nodes > 1);
    }

    #[test]
    fn test_satisfaction_without_objective() {
        let mut model = CpModel::new("test");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        model.add_linear(LinearExpr::sum([a, b]), Comparison::Eq, 1);

        let solution = BranchAndBoundSolver::new().solve(&model, &quick());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert!(solution.objective_value.is_none());
        assert!(model.is_satisfied_by(&solution.values));
    }

    #[test]
    fn test_squared_deviation_objective() {
        // Two people share 4 unit shifts; squared deviation from 2 is minimal at 2/2.
        let mut model = CpModel::new("balance");
        let shifts: Vec<Vec<_>> = (0..2)
            .map(|p| (0..4).map(|s| model.new_bool_var(format!("p{p}s{s}"))).collect())
            .collect();
        for s in 0..4 {
            model.add_eq(LinearExpr::sum(shifts.iter().map(|row| row[s])), 1);
        }
        let mut total = LinearExpr::new();
        for (p, row) in shifts.iter().enumerate() {
            let dev = model.new_int_var(format!("dev{p}"), -2, 2);
            let abs = model.new_int_var(format!("abs{p}"), 0, 2);
            let sq = model.new_int_var(format!("sq{p}"), 0, 4);
            let mut def = LinearExpr::sum(row.iter().copied());
            def.add_term(dev, -1);
            model.add_eq(def, 2);
            model.add_abs_equality(abs, dev);
            model.add_product_equality(sq, vec![abs, abs]);
            total.add_term(sq, 1);
        }
        model.minimize(total);

        let solution = BranchAndBoundSolver::new().solve(&model, &quick());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(0));
        let first: i64 = shifts[0].iter().map(|&v| solution.value(v).unwrap()).sum();
        assert_eq!(first, 2);
    }

    #[test]
    fn test_bottleneck_objective() {
        let mut model = CpModel::new("bottleneck");
        let shifts: Vec<Vec<_>> = (0..3)
            .map(|p| (0..6).map(|s| model.new_bool_var(format!("p{p}s{s}"))).collect())
            .collect();
        for s in 0..6 {
            model.add_eq(LinearExpr::sum(shifts.iter().map(|row| row[s])), 1);
        }
        let loads: Vec<_> = shifts
            .iter()
            .enumerate()
            .map(|(p, row)| {
                let w = model.new_int_var(format!("w{p}"), 0, 6);
                let mut def = LinearExpr::sum(row.iter().copied());
                def.add_term(w, -1);
                model.add_eq(def, 0);
                w
            })
            .collect();
        let peak = model.new_int_var("peak", 0, 6);
        model.add_max_equality(peak, loads);
        model.minimize(LinearExpr::from(peak));

        let solution = BranchAndBoundSolver::new().solve(&model, &quick());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(solution.objective_value, Some(2));
    }

    #[test]
    fn test_stop_after_first() {
        let mut model = CpModel::new("test");
        let vars: Vec<_> = (0..4).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        model.add_eq(LinearExpr::sum(vars.iter().copied()), 2);
        model.minimize(LinearExpr::sum(vars.iter().copied()));

        let config = quick().with_stop_after_first(true);
        let solution = BranchAndBoundSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert_eq!(solution.objective_value, Some(2));
    }

    #[test]
    fn test_multiple_workers_agree() {
        let mut model = CpModel::new("test");
        let vars: Vec<_> = (0..6).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        model.add_eq(LinearExpr::sum(vars.iter().copied()), 3);
        model.minimize(
            vars.iter()
                .enumerate()
                .map(|(i, &v)| (v, (i as i64 * 7) % 5 + 1))
                .collect(),
        );

        let single = BranchAndBoundSolver::new().solve(&model, &quick());
        let multi = BranchAndBoundSolver::new()
            .solve(&model, &quick().with_num_workers(3).with_seed(7));
        assert_eq!(single.status, SolverStatus::Optimal);
        assert_eq!(multi.status, SolverStatus::Optimal);
        assert_eq!(single.objective_value, multi.objective_value);
    }

    #[test]
    fn test_invalid_model() {
        let mut model = CpModel::new("test");
        model.new_int_var("x", 3, 1);

        let solution = BranchAndBoundSolver::new().solve(&model, &quick());
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
    }

    #[test]
    fn test_invalid_config() {
        let model = CpModel::new("test");
        let solution =
            BranchAndBoundSolver::new().solve(&model, &SolverConfig::default().with_num_workers(0));
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
    }

    #[test]
    fn test_branching_order_shuffles_only_later_workers() {
        let mut model = CpModel::new("test");
        for i in 0..8 {
            model.new_bool_var(format!("x{i}"));
        }
        model.new_int_var("k", 0, 3);
        let search = Search::new(&model, &quick(), Instant::now());

        let first = search.branching_order(0, 1);
        assert_eq!(first, (0..9).collect::<Vec<_>>());
        let other = search.branching_order(1, 1);
        assert_eq!(other.len(), 9);
        assert_eq!(*other.last().unwrap(), 8);
    }
}
