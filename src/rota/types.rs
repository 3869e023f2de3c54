//! Rota domain types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::availability::AvailabilityMatrix;
use crate::error::RotaError;

/// Staffing role within a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Primary staffing.
    Main,
    /// Backup staffing.
    Standby,
}

impl Role {
    /// Both roles, main first.
    pub const ALL: [Role; 2] = [Role::Main, Role::Standby];

    pub fn label(self) -> &'static str {
        match self {
            Role::Main => "main",
            Role::Standby => "standby",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One shift window: a (day, period) pair, as indices into the configured lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub day: usize,
    pub period: usize,
}

impl Slot {
    pub fn new(day: usize, period: usize) -> Self {
        Self { day, period }
    }

    /// Day-major flat index given the number of periods per day.
    pub fn index(self, periods: usize) -> usize {
        self.day * periods + self.period
    }

    /// Inverse of [`Slot::index`].
    pub fn from_index(index: usize, periods: usize) -> Self {
        Self {
            day: index / periods,
            period: index % periods,
        }
    }
}

/// A person who can be rostered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub first: String,
    pub last: String,
    pub email: String,
    /// Effective cap on total shifts (main + standby) for the week.
    pub max_shifts: u32,
    /// Cap as parsed from input. `None` when the default policy applied.
    pub declared_max_shifts: Option<u32>,
}

impl Person {
    /// Creates a person with an explicitly declared cap.
    pub fn new(first: impl Into<String>, last: impl Into<String>, email: impl Into<String>, max_shifts: u32) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
            email: email.into(),
            max_shifts,
            declared_max_shifts: Some(max_shifts),
        }
    }

    /// Creates a person whose cap fell back to `default_cap`.
    pub fn with_default_cap(
        first: impl Into<String>,
        last: impl Into<String>,
        email: impl Into<String>,
        default_cap: u32,
    ) -> Self {
        Self {
            declared_max_shifts: None,
            ..Self::new(first, last, email, default_cap)
        }
    }

    /// "First Last", trimmed when the last name is empty.
    pub fn full_name(&self) -> String {
        if self.last.is_empty() {
            self.first.clone()
        } else {
            format!("{} {}", self.first, self.last)
        }
    }

    /// Whether the cap came from the default policy.
    pub fn uses_default_cap(&self) -> bool {
        self.declared_max_shifts.is_none()
    }
}

/// People plus their availability: everything a solve needs besides configuration.
#[derive(Debug, Clone)]
pub struct RotaProblem {
    pub people: Vec<Person>,
    pub availability: AvailabilityMatrix,
}

impl RotaProblem {
    /// Pairs people with availability rows; row `i` belongs to `people[i]`.
    pub fn new(people: Vec<Person>, availability: AvailabilityMatrix) -> Result<Self, RotaError> {
        if people.is_empty() {
            return Err(RotaError::EmptyRoster);
        }
        if availability.person_count() != people.len() {
            return Err(RotaError::InvalidConfig(format!(
                "{} people but {} availability rows",
                people.len(),
                availability.person_count()
            )));
        }
        Ok(Self {
            people,
            availability,
        })
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }
}
