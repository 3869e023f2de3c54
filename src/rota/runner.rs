//! Build, solve and aggregate in one call.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::cp::{BranchAndBoundSolver, CpSolver, SolverConfig, SolverStatus};
use crate::error::RotaError;

use super::aggregate::{aggregate, Roster};
use super::builder::RotaCpBuilder;
use super::config::RotaConfig;
use super::types::RotaProblem;

/// How far the solver got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveQuality {
    /// Proven optimal.
    Optimal,
    /// Best found before the time budget ran out.
    BestEffort,
}

/// Result of a rota run.
#[derive(Debug, Clone, Serialize)]
pub struct RotaOutcome {
    pub quality: SolveQuality,
    /// Objective value of the returned roster.
    pub objective_value: Option<i64>,
    pub roster: Roster,
    /// Solver wall time in milliseconds.
    pub solve_time_ms: i64,
}

/// Executes the rota pipeline.
pub struct RotaRunner;

impl RotaRunner {
    /// Solves with the bundled solver and the budget from `config`.
    pub fn run(problem: &RotaProblem, config: &RotaConfig) -> Result<RotaOutcome, RotaError> {
        Self::run_with(problem, config, &BranchAndBoundSolver::new(), &config.solver_config())
    }

    /// Solves with any [`CpSolver`] backend.
    pub fn run_with<S: CpSolver>(
        problem: &RotaProblem,
        config: &RotaConfig,
        solver: &S,
        solver_config: &SolverConfig,
    ) -> Result<RotaOutcome, RotaError> {
        let built = RotaCpBuilder::new(problem, config).build()?;
        info!(
            people = problem.person_count(),
            slots = config.slot_count(),
            variables = built.model.variable_count(),
            time_limit_ms = solver_config.time_limit_ms,
            "solving rota"
        );

        let solution = solver.solve(&built.model, solver_config);
        let quality = match solution.status {
            SolverStatus::Optimal => SolveQuality::Optimal,
            SolverStatus::Feasible => {
                warn!(
                    objective = ?solution.objective_value,
                    "time budget exhausted, returning best rota found"
                );
                SolveQuality::BestEffort
            }
            SolverStatus::Infeasible => return Err(RotaError::Infeasible),
            SolverStatus::Timeout => {
                return Err(RotaError::NoSolutionWithinBudget {
                    time_limit_ms: solver_config.time_limit_ms,
                })
            }
            SolverStatus::ModelInvalid => return Err(RotaError::ModelInvalid),
        };

        if !built.model.is_satisfied_by(&solution.values) {
            error!(
                status = ?solution.status,
                values = solution.values.len(),
                variables = built.model.variable_count(),
                "solver assignment violates the model"
            );
            return Err(RotaError::InvalidSolution {
                status: format!("{:?}", solution.status),
            });
        }

        let roster = aggregate(problem, config, &built.fabric, &solution);
        info!(
            status = ?solution.status,
            objective = ?solution.objective_value,
            nodes = solution.nodes,
            solve_time_ms = solution.solve_time_ms,
            "rota solved"
        );

        Ok(RotaOutcome {
            quality,
            objective_value: solution.objective_value,
            roster,
            solve_time_ms: solution.solve_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{CpModel, CpSolution};
    use crate::rota::{AvailabilityMatrix, Person, Preference};

    /// Backend that always reports the same status and no values.
    struct Fixed(SolverStatus);

    impl CpSolver for Fixed {
        fn solve(&self, _model: &CpModel, _config: &SolverConfig) -> CpSolution {
            CpSolution::empty(self.0)
        }
    }

    /// Bundled solver whose result is reported as merely feasible.
    struct Downgraded;

    impl CpSolver for Downgraded {
        fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
            let mut solution = BranchAndBoundSolver::new().solve(model, config);
            solution.status = SolverStatus::Feasible;
            solution
        }
    }

    /// Backend that claims optimality with every variable set to 0.
    struct AllZero;

    impl CpSolver for AllZero {
        fn solve(&self, model: &CpModel, _config: &SolverConfig) -> CpSolution {
            let mut solution = CpSolution::empty(SolverStatus::Optimal);
            solution.values = vec![0; model.variable_count()];
            solution.objective_value = Some(0);
            solution
        }
    }

    fn small(prefs: Vec<Vec<Preference>>) -> (RotaProblem, RotaConfig) {
        let config = RotaConfig::default()
            .with_days(&["Mon"])
            .with_staffing(1, 0)
            .with_max_time_seconds(10);
        let people = (0..prefs.len())
            .map(|i| Person::new(format!("P{i}"), "", "", 2))
            .collect();
        let matrix = AvailabilityMatrix::from_rows(1, 2, prefs);
        (RotaProblem::new(people, matrix).unwrap(), config)
    }

    #[test]
    fn test_run_optimal() {
        crate::logging::init_test();
        let (problem, config) = small(vec![vec![Preference::Yes; 2]; 2]);
        let outcome = RotaRunner::run(&problem, &config).unwrap();
        assert_eq!(outcome.quality, SolveQuality::Optimal);
        assert!(outcome.roster.slots.iter().all(|s| s.main.len() == 1));
        // One shift per day: each person covers exactly one period.
        assert!(outcome.roster.people.iter().all(|p| p.main == 1));
    }

    #[test]
    fn test_run_infeasible() {
        let (problem, config) = small(vec![vec![Preference::No; 2]; 2]);
        assert!(matches!(
            RotaRunner::run(&problem, &config),
            Err(RotaError::Infeasible)
        ));
    }

    #[test]
    fn test_status_mapping() {
        let (problem, config) = small(vec![vec![Preference::Yes; 2]; 2]);
        let solver_config = SolverConfig::default().with_time_limit_ms(5);
        assert!(matches!(
            RotaRunner::run_with(&problem, &config, &Fixed(SolverStatus::Timeout), &solver_config),
            Err(RotaError::NoSolutionWithinBudget { time_limit_ms: 5 })
        ));
        assert!(matches!(
            RotaRunner::run_with(&problem, &config, &Fixed(SolverStatus::ModelInvalid), &solver_config),
            Err(RotaError::ModelInvalid)
        ));
        let outcome = RotaRunner::run_with(
            &problem,
            &config,
            &Downgraded,
            &SolverConfig::default().with_time_limit_ms(10_000),
        )
        .unwrap();
        assert_eq!(outcome.quality, SolveQuality::BestEffort);
        assert!(outcome.roster.slots.iter().all(|s| s.main.len() == 1));
    }

    #[test]
    fn test_solution_without_values_rejected() {
        let (problem, config) = small(vec![vec![Preference::Yes; 2]; 2]);
        let solver_config = SolverConfig::default();
        for status in [SolverStatus::Feasible, SolverStatus::Optimal] {
            let err = RotaRunner::run_with(&problem, &config, &Fixed(status), &solver_config)
                .unwrap_err();
            assert!(matches!(err, RotaError::InvalidSolution { .. }));
        }
    }

    #[test]
    fn test_assignment_breaking_staffing_rejected() {
        let (problem, config) = small(vec![vec![Preference::Yes; 2]; 2]);
        let err = RotaRunner::run_with(&problem, &config, &AllZero, &SolverConfig::default())
            .unwrap_err();
        assert!(matches!(err, RotaError::InvalidSolution { ref status } if status == "Optimal"));
    }

    #[test]
    fn test_invalid_config_not_solved() {
        let (problem, config) = small(vec![vec![Preference::Yes; 2]]);
        let config = config.with_num_workers(0);
        assert!(matches!(
            RotaRunner::run(&problem, &config),
            Err(RotaError::InvalidConfig(_))
        ));
    }
}
