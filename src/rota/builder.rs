//! Assembles the full CP model for a rota.

use tracing::debug;

use crate::cp::CpModel;
use crate::error::RotaError;

use super::config::RotaConfig;
use super::constraints;
use super::fabric::VariableFabric;
use super::objective::{self, ObjectiveTerms};
use super::types::RotaProblem;

/// A built model together with the handles needed to read solutions back.
#[derive(Debug, Clone)]
pub struct RotaModel {
    pub model: CpModel,
    pub fabric: VariableFabric,
    pub objective: ObjectiveTerms,
}

/// Builds a CP model from people, availability and configuration.
///
/// Creates:
/// - The variable fabric: one boolean per (person, slot, role)
/// - Staffing, one-shift-per-day, capacity and availability constraints
/// - The fairness objective with the preference penalty
///
/// # Example
/// ```
/// use u_rota::rota::{AvailabilityMatrix, Person, Preference, RotaConfig, RotaCpBuilder, RotaProblem};
///
/// let config = RotaConfig::default()
///     .with_days(&["Mon"])
///     .with_staffing(1, 0);
/// let matrix = AvailabilityMatrix::from_rows(1, 2, vec![vec![Preference::Yes; 2]; 2]);
/// let people = vec![Person::new("A", "", "", 1), Person::new("B", "", "", 1)];
/// let problem = RotaProblem::new(people, matrix).unwrap();
///
/// let built = RotaCpBuilder::new(&problem, &config).build().unwrap();
/// assert_eq!(built.model.bool_var_count(), 8);
/// ```
pub struct RotaCpBuilder<'a> {
    problem: &'a RotaProblem,
    config: &'a RotaConfig,
}

impl<'a> RotaCpBuilder<'a> {
    pub fn new(problem: &'a RotaProblem, config: &'a RotaConfig) -> Self {
        Self { problem, config }
    }

    /// Validates inputs and builds a fresh model.
    pub fn build(&self) -> Result<RotaModel, RotaError> {
        self.config.validate().map_err(RotaError::InvalidConfig)?;
        if self.problem.people.is_empty() {
            return Err(RotaError::EmptyRoster);
        }
        let availability = &self.problem.availability;
        // Fields are public, so `RotaProblem::new` may have been bypassed.
        if availability.person_count() != self.problem.people.len() {
            return Err(RotaError::InvalidConfig(format!(
                "{} people but {} availability rows",
                self.problem.people.len(),
                availability.person_count()
            )));
        }
        if availability.days() != self.config.days.len()
            || availability.periods() != self.config.periods.len()
        {
            return Err(RotaError::SlotMismatch {
                expected: self.config.slot_count(),
                found: availability.slot_count(),
            });
        }

        let mut model = CpModel::new("rota");
        let fabric = VariableFabric::new(&mut model, self.problem.person_count(), self.config);
        let hard = constraints::add_all(&mut model, &fabric, self.problem, self.config);
        let objective = objective::add_objective(&mut model, &fabric, self.problem, self.config);

        debug!(
            people = self.problem.person_count(),
            slots = self.config.slot_count(),
            variables = model.variable_count(),
            hard_constraints = hard,
            constraints = model.constraint_count(),
            fairness = %self.config.fairness,
            "rota model built"
        );

        Ok(RotaModel {
            model,
            fabric,
            objective,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rota::{AvailabilityMatrix, FairnessStrategy, Person, Preference};

    fn problem(days: usize, periods: usize, n: usize) -> RotaProblem {
        let matrix =
            AvailabilityMatrix::from_rows(days, periods, vec![vec![Preference::Yes; days * periods]; n]);
        let people = (0..n).map(|i| Person::new(format!("P{i}"), "", "", 2)).collect();
        RotaProblem::new(people, matrix).unwrap()
    }

    #[test]
    fn test_build_sizes() {
        let config = RotaConfig::default().with_days(&["Mon", "Tue"]).with_staffing(1, 1);
        let built = RotaCpBuilder::new(&problem(2, 2, 3), &config).build().unwrap();
        assert_eq!(built.model.bool_var_count(), 3 * 4 * 2);
        // variance: 2 squared deviations per person, 3 aux vars each
        assert_eq!(built.model.variable_count(), 24 + 3 * 6);
        assert!(built.model.validate().is_ok());
    }

    #[test]
    fn test_build_bottleneck() {
        let config = RotaConfig::default()
            .with_days(&["Mon", "Tue"])
            .with_fairness(FairnessStrategy::Bottleneck);
        let built = RotaCpBuilder::new(&problem(2, 2, 3), &config).build().unwrap();
        // one load per person plus the peak
        assert_eq!(built.model.variable_count(), 24 + 3 + 1);
    }

    #[test]
    fn test_slot_mismatch() {
        let config = RotaConfig::default();
        let err = RotaCpBuilder::new(&problem(2, 2, 1), &config).build().unwrap_err();
        assert!(matches!(
            err,
            RotaError::SlotMismatch {
                expected: 14,
                found: 4
            }
        ));
    }

    #[test]
    fn test_row_count_rechecked() {
        let config = RotaConfig::default().with_days(&["Mon", "Tue"]);
        let mut problem = problem(2, 2, 3);
        problem.people.push(Person::new("Extra", "", "", 2));
        let err = RotaCpBuilder::new(&problem, &config).build().unwrap_err();
        assert!(matches!(err, RotaError::InvalidConfig(ref m) if m == "4 people but 3 availability rows"));
    }

    #[test]
    fn test_invalid_config() {
        let config = RotaConfig::default().with_days(&["Mon", "Tue"]).with_weights(0, 1);
        let err = RotaCpBuilder::new(&problem(2, 2, 1), &config).build().unwrap_err();
        assert!(matches!(err, RotaError::InvalidConfig(_)));
    }
}
