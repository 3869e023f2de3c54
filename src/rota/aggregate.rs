//! Reads a solved assignment back into rosters and per-person totals.

use serde::Serialize;

use crate::cp::CpSolution;

use super::availability::Preference;
use super::config::RotaConfig;
use super::fabric::{Assignment, VariableFabric};
use super::types::{RotaProblem, Role, Slot};

/// Who works one slot, in person order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRoster {
    pub slot: Slot,
    pub main: Vec<usize>,
    pub standby: Vec<usize>,
}

/// Totals for one person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersonSummary {
    pub main: u32,
    pub standby: u32,
    /// Shifts worked in slots labelled `Maybe`.
    pub maybe: u32,
    /// `main_weight * main + standby_weight * standby`.
    pub score: i64,
}

impl PersonSummary {
    pub fn total(&self) -> u32 {
        self.main + self.standby
    }
}

/// The decoded rota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    /// One entry per slot, day-major.
    pub slots: Vec<SlotRoster>,
    /// One entry per person, in input order (zero-shift people included).
    pub people: Vec<PersonSummary>,
    /// Every true assignment, slot-major then person order.
    pub assignments: Vec<(usize, Slot, Role)>,
}

impl Roster {
    /// Slots and roles worked by `person`, in slot order.
    pub fn shifts_of(&self, person: usize) -> impl Iterator<Item = (Slot, Role)> + '_ {
        self.assignments
            .iter()
            .filter(move |&&(p, _, _)| p == person)
            .map(|&(_, slot, role)| (slot, role))
    }
}

/// Folds the true assignments of `solution` into a [`Roster`].
///
/// Pure: the same solution always yields the same roster.
pub fn aggregate(
    problem: &RotaProblem,
    config: &RotaConfig,
    fabric: &VariableFabric,
    solution: &CpSolution,
) -> Roster {
    let assignments: Vec<Assignment> = fabric.assignments(solution).collect();

    let slots = fabric
        .slots()
        .map(|slot| {
            let in_slot = |role: Role| -> Vec<usize> {
                assignments
                    .iter()
                    .filter(|a| a.slot == slot && a.role == role)
                    .map(|a| a.person)
                    .collect()
            };
            SlotRoster {
                slot,
                main: in_slot(Role::Main),
                standby: in_slot(Role::Standby),
            }
        })
        .collect();

    let people = assignments.iter().fold(
        vec![PersonSummary::default(); problem.person_count()],
        |mut acc, a| {
            let summary = &mut acc[a.person];
            match a.role {
                Role::Main => {
                    summary.main += 1;
                    summary.score += config.main_shift_weighting;
                }
                Role::Standby => {
                    summary.standby += 1;
                    summary.score += config.standby_shift_weighting;
                }
            }
            if problem.availability.get(a.person, a.slot) == Preference::Maybe {
                summary.maybe += 1;
            }
            acc
        },
    );

    Roster {
        slots,
        people,
        assignments: assignments
            .iter()
            .map(|a| (a.person, a.slot, a.role))
            .collect(),
    }
}
