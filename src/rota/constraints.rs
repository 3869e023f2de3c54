//! Hard constraints over the variable fabric.
//!
//! Each family is a separate function so models can be assembled (and
//! tested) piecewise. Every function returns the number of constraints it
//! added.

use crate::cp::{CpModel, LinearExpr};

use super::availability::Preference;
use super::config::RotaConfig;
use super::fabric::VariableFabric;
use super::types::{RotaProblem, Role};

/// Exact headcount per slot and role.
///
/// `Σ_p main[p, slot] == num_main_workers` and
/// `Σ_p standby[p, slot] == num_standby_workers` for every slot. These are
/// equalities: a roster with a missing or extra person is infeasible.
pub fn add_staffing(model: &mut CpModel, fabric: &VariableFabric, config: &RotaConfig) -> usize {
    let mut added = 0;
    for slot in fabric.slots() {
        for (role, target) in [
            (Role::Main, config.num_main_workers),
            (Role::Standby, config.num_standby_workers),
        ] {
            let people = (0..fabric.person_count()).map(|p| fabric.var(p, slot, role));
            model.add_eq(LinearExpr::sum(people), target as i64);
            added += 1;
        }
    }
    added
}

/// At most one (period, role) assignment per person per day.
pub fn add_one_shift_per_day(
    model: &mut CpModel,
    fabric: &VariableFabric,
    config: &RotaConfig,
) -> usize {
    let mut added = 0;
    for p in 0..fabric.person_count() {
        for day in 0..config.days.len() {
            let vars = fabric
                .slots()
                .filter(|slot| slot.day == day)
                .flat_map(|slot| [fabric.main(p, slot), fabric.standby(p, slot)]);
            model.add_le(LinearExpr::sum(vars), 1);
            added += 1;
        }
    }
    added
}

/// Unweighted volume cap: `Σ (main + standby) <= max_shifts` per person.
pub fn add_capacity(model: &mut CpModel, fabric: &VariableFabric, problem: &RotaProblem) -> usize {
    for (p, person) in problem.people.iter().enumerate() {
        let total = fabric.workload(p, 1, 1);
        model.add_le(total, person.max_shifts as i64);
    }
    problem.people.len()
}

/// Forces both roles to 0 wherever the label is `No`.
pub fn add_availability(
    model: &mut CpModel,
    fabric: &VariableFabric,
    problem: &RotaProblem,
) -> usize {
    let mut added = 0;
    for p in 0..fabric.person_count() {
        for slot in fabric.slots() {
            if problem.availability.get(p, slot) == Preference::No {
                model.add_eq(LinearExpr::from(fabric.main(p, slot)), 0);
                model.add_eq(LinearExpr::from(fabric.standby(p, slot)), 0);
                added += 2;
            }
        }
    }
    added
}

/// Adds all four families.
pub fn add_all(
    model: &mut CpModel,
    fabric: &VariableFabric,
    problem: &RotaProblem,
    config: &RotaConfig,
) -> usize {
    add_staffing(model, fabric, config)
        + add_one_shift_per_day(model, fabric, config)
        + add_capacity(model, fabric, problem)
        + add_availability(model, fabric, problem)
}
