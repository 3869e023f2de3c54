//! CP solver interface.

use super::model::CpModel;
use super::variables::VarId;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible solution found, optimality not proven within the budget.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Budget exhausted before any feasible solution was found.
    Timeout,
}

/// Solution from a CP solver.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if any).
    pub objective_value: Option<i64>,
    /// Dense variable assignment indexed by [`VarId::index`].
    ///
    /// Empty unless a solution was found.
    pub values: Vec<i64>,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
    /// Search nodes explored across all workers.
    pub nodes: u64,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            solve_time_ms: 0,
            nodes: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Value assigned to `var`, if a solution was found.
    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.get(var.index()).copied()
    }

    /// Whether boolean `var` is set in the solution. Unassigned reads as false.
    pub fn is_true(&self, var: VarId) -> bool {
        self.value(var) == Some(1)
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds.
    pub time_limit_ms: i64,
    /// Number of search workers.
    pub num_workers: usize,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
    /// Seed for the branching order of workers beyond the first.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            num_workers: 1,
            stop_after_first: false,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: i64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_ms <= 0 {
            return Err(format!(
                "time_limit_ms must be positive, got {}",
                self.time_limit_ms
            ));
        }
        if self.num_workers == 0 {
            return Err("num_workers must be at least 1".into());
        }
        Ok(())
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic. This can wrap
/// external solvers (e.g., OR-Tools CP-SAT, an ILP backend) or the bundled
/// [`BranchAndBoundSolver`](super::BranchAndBoundSolver).
///
/// The call blocks for at most `config.time_limit_ms`. Implementations must
/// report [`SolverStatus::Infeasible`] only when infeasibility is proven,
/// and [`SolverStatus::Feasible`] when the budget expired with a solution
/// whose optimality is unproven.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}
