//! CSV ingestion of people and availability.
//!
//! Expected headers: `First`, `Last`, `email`, `days` and one
//! `<Day>_<period>` column per configured slot. `First` and the slot
//! columns are required; the rest default to empty or to the configured
//! cap. Header names and cells are trimmed.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::error::{InputError, RotaError};
use crate::rota::{AvailabilityMatrix, Person, RotaConfig, RotaProblem};

/// Parses a declared shift cap.
///
/// Accepts a non-negative integer, or a float with no fractional part
/// (spreadsheets export `3` as `3.0`). Anything else falls back to
/// `default_cap`. Returns the effective cap and the declared one, if any.
pub fn parse_max_shifts(raw: &str, default_cap: u32) -> (u32, Option<u32>) {
    let raw = raw.trim();
    let declared = raw.parse::<u32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
            .map(|v| v as u32)
    });
    match declared {
        Some(cap) => (cap, Some(cap)),
        None => (default_cap, None),
    }
}

fn field(record: &StringRecord, col: Option<usize>) -> &str {
    col.and_then(|c| record.get(c)).map(str::trim).unwrap_or("")
}

/// Reads a rota problem from CSV text.
pub fn read_csv<R: Read>(reader: R, config: &RotaConfig) -> Result<RotaProblem, RotaError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: HashMap<String, usize> = reader
        .headers()
        .map_err(InputError::from)?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();

    let column = |name: &str| -> Result<usize, InputError> {
        headers
            .get(name)
            .copied()
            .ok_or_else(|| InputError::MissingColumn(name.to_string()))
    };
    let first_col = column("First")?;
    let last_col = headers.get("Last").copied();
    let email_col = headers.get("email").copied();
    let days_col = headers.get("days").copied();
    let slot_cols = config
        .slots()
        .map(|slot| column(&config.slot_key(slot)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut people = Vec::new();
    let mut matrix = AvailabilityMatrix::new(config.days.len(), config.periods.len());
    for record in reader.records() {
        let record = record.map_err(InputError::from)?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let first = field(&record, Some(first_col));
        let raw_cap = field(&record, days_col);
        let (cap, declared) = parse_max_shifts(raw_cap, config.default_max_shifts);
        if declared.is_none() {
            debug!(
                person = first,
                raw = raw_cap,
                default = config.default_max_shifts,
                "max shifts not numeric, using default"
            );
        }
        let mut person = Person::new(first, field(&record, last_col), field(&record, email_col), cap);
        person.declared_max_shifts = declared;

        let cells: Vec<Option<&str>> = slot_cols
            .iter()
            .map(|&c| record.get(c).map(str::trim))
            .collect();
        matrix.push_raw(first, &cells);
        people.push(person);
    }

    info!(
        people = people.len(),
        normalized = matrix.warnings().len(),
        "availability loaded"
    );
    RotaProblem::new(people, matrix)
}

/// Reads a rota problem from a CSV file.
pub fn load_csv(path: impl AsRef<Path>, config: &RotaConfig) -> Result<RotaProblem, RotaError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file, config)
}
