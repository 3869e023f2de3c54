//! Availability matrix: per-person, per-slot preference labels.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::Slot;

/// A person's stated willingness for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    /// Willing; no penalty, no reward.
    Yes,
    /// Explicitly preferred; rewarded when used for a main shift.
    Best,
    /// Tolerated; penalized when used.
    Maybe,
    /// Unavailable; hard exclusion.
    No,
}

impl Preference {
    /// Parses a label case-insensitively, ignoring surrounding whitespace.
    ///
    /// Returns `None` for anything that is not one of the four labels.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_rota::rota::Preference;
    ///
    /// assert_eq!(Preference::parse("  Best "), Some(Preference::Best));
    /// assert_eq!(Preference::parse("MAYBE"), Some(Preference::Maybe));
    /// assert_eq!(Preference::parse("7"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Preference::Yes),
            "best" => Some(Preference::Best),
            "maybe" => Some(Preference::Maybe),
            "no" => Some(Preference::No),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preference::Yes => "yes",
            Preference::Best => "best",
            Preference::Maybe => "maybe",
            Preference::No => "no",
        }
    }

    /// Whether the person may be assigned to the slot at all.
    pub fn is_available(self) -> bool {
        self != Preference::No
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A cell that was not a recognised label and was read as [`Preference::No`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationWarning {
    pub person: usize,
    pub slot: Slot,
    /// Original cell text; `None` when the cell was absent.
    pub raw: Option<String>,
}

/// Preference label for every (person, slot), rows in person order.
#[derive(Debug, Clone)]
pub struct AvailabilityMatrix {
    days: usize,
    periods: usize,
    rows: Vec<Vec<Preference>>,
    warnings: Vec<NormalizationWarning>,
}

impl AvailabilityMatrix {
    /// Creates an empty matrix for `days * periods` slots.
    pub fn new(days: usize, periods: usize) -> Self {
        Self {
            days,
            periods,
            rows: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Builds a matrix from already-parsed rows.
    pub fn from_rows(days: usize, periods: usize, rows: Vec<Vec<Preference>>) -> Self {
        let mut matrix = Self::new(days, periods);
        for row in rows {
            matrix.push_preferences(row);
        }
        matrix
    }

    pub fn slot_count(&self) -> usize {
        self.days * self.periods
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Appends a parsed row. Short rows are padded with `No`, long rows truncated.
    pub fn push_preferences(&mut self, mut row: Vec<Preference>) -> usize {
        row.resize(self.slot_count(), Preference::No);
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Appends a row of raw cell text in slot order, normalizing each cell.
    ///
    /// Unrecognised or missing cells become `No`; each one is logged and
    /// recorded in [`warnings`](Self::warnings). `who` only labels the log line.
    pub fn push_raw(&mut self, who: &str, cells: &[Option<&str>]) -> usize {
        let person = self.rows.len();
        let periods = self.periods;
        let row: Vec<Preference> = (0..self.slot_count())
            .map(|i| {
                let raw = cells.get(i).copied().flatten();
                match raw.and_then(Preference::parse) {
                    Some(pref) => pref,
                    None => {
                        let slot = Slot::from_index(i, periods);
                        warn!(
                            person = who,
                            day = slot.day,
                            period = slot.period,
                            raw = raw.unwrap_or(""),
                            "unrecognised availability parsed as no"
                        );
                        self.warnings.push(NormalizationWarning {
                            person,
                            slot,
                            raw: raw.map(str::to_owned),
                        });
                        Preference::No
                    }
                }
            })
            .collect();
        self.rows.push(row);
        person
    }

    pub fn person_count(&self) -> usize {
        self.rows.len()
    }

    /// Label for `person` at `slot`.
    pub fn get(&self, person: usize, slot: Slot) -> Preference {
        self.rows[person][slot.index(self.periods)]
    }

    /// Cells normalized to `No` while loading.
    pub fn warnings(&self) -> &[NormalizationWarning] {
        &self.warnings
    }
}
