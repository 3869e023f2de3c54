//! Variable fabric: one boolean per (person, slot, role).

use crate::cp::{CpModel, CpSolution, LinearExpr, VarId};

use super::config::RotaConfig;
use super::types::{Role, Slot};

/// A true assignment read back from a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub person: usize,
    pub slot: Slot,
    pub role: Role,
}

/// Decision variables of one solve.
///
/// Variables are named `main_p{p}_d{d}_t{t}` and `standby_p{p}_d{d}_t{t}`.
#[derive(Debug, Clone)]
pub struct VariableFabric {
    people: usize,
    periods: usize,
    slots: usize,
    main: Vec<VarId>,
    standby: Vec<VarId>,
}

impl VariableFabric {
    /// Declares `people * slots * 2` fresh boolean variables in `model`.
    pub fn new(model: &mut CpModel, people: usize, config: &RotaConfig) -> Self {
        let periods = config.periods.len();
        let slots = config.slot_count();
        let mut main = Vec::with_capacity(people * slots);
        let mut standby = Vec::with_capacity(people * slots);
        for p in 0..people {
            for slot in config.slots() {
                let (d, t) = (slot.day, slot.period);
                main.push(model.new_bool_var(format!("main_p{p}_d{d}_t{t}")));
                standby.push(model.new_bool_var(format!("standby_p{p}_d{d}_t{t}")));
            }
        }
        Self {
            people,
            periods,
            slots,
            main,
            standby,
        }
    }

    fn offset(&self, person: usize, slot: Slot) -> usize {
        person * self.slots + slot.index(self.periods)
    }

    pub fn person_count(&self) -> usize {
        self.people
    }

    pub fn main(&self, person: usize, slot: Slot) -> VarId {
        self.main[self.offset(person, slot)]
    }

    pub fn standby(&self, person: usize, slot: Slot) -> VarId {
        self.standby[self.offset(person, slot)]
    }

    pub fn var(&self, person: usize, slot: Slot, role: Role) -> VarId {
        match role {
            Role::Main => self.main(person, slot),
            Role::Standby => self.standby(person, slot),
        }
    }

    /// All slots covered by the fabric, day-major.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.slots).map(move |i| Slot::from_index(i, self.periods))
    }

    /// `main_weight * Σ main + standby_weight * Σ standby` for one person.
    pub fn workload(&self, person: usize, main_weight: i64, standby_weight: i64) -> LinearExpr {
        let mut expr = LinearExpr::new();
        for slot in self.slots() {
            if main_weight != 0 {
                expr.add_term(self.main(person, slot), main_weight);
            }
            if standby_weight != 0 {
                expr.add_term(self.standby(person, slot), standby_weight);
            }
        }
        expr
    }

    /// Assignments set in `solution`, slot-major then person order then role.
    pub fn assignments<'a>(
        &'a self,
        solution: &'a CpSolution,
    ) -> impl Iterator<Item = Assignment> + 'a {
        self.slots().flat_map(move |slot| {
            (0..self.people).flat_map(move |person| {
                Role::ALL
                    .into_iter()
                    .filter(move |&role| solution.is_true(self.var(person, slot, role)))
                    .map(move |role| Assignment { person, slot, role })
            })
        })
    }
}
