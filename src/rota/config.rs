//! Rota configuration.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::Slot;
use crate::cp::SolverConfig;
use crate::error::InputError;

/// How workload fairness enters the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FairnessStrategy {
    /// Minimize the largest weighted workload of any single person.
    Bottleneck,
    /// Minimize squared deviations of weighted workloads from the average,
    /// plus a parallel term over main shifts alone.
    #[default]
    Variance,
}

impl FromStr for FairnessStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottleneck" | "max" => Ok(FairnessStrategy::Bottleneck),
            "variance" | "squared" => Ok(FairnessStrategy::Variance),
            other => Err(format!("unknown fairness strategy: {other}")),
        }
    }
}

impl fmt::Display for FairnessStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FairnessStrategy::Bottleneck => "bottleneck",
            FairnessStrategy::Variance => "variance",
        })
    }
}

/// Configuration for building and solving a weekly rota.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
///
/// # Examples
///
/// ```
/// use u_rota::rota::{FairnessStrategy, RotaConfig};
///
/// let config = RotaConfig::default()
///     .with_days(&["Mon", "Tue"])
///     .with_staffing(2, 1)
///     .with_fairness(FairnessStrategy::Bottleneck)
///     .with_max_time_seconds(30);
/// assert_eq!(config.slot_count(), 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotaConfig {
    /// Ordered day names.
    pub days: Vec<String>,
    /// Ordered period names within a day.
    pub periods: Vec<String>,
    /// Exact main-role headcount per slot.
    pub num_main_workers: u32,
    /// Exact standby-role headcount per slot.
    pub num_standby_workers: u32,
    /// Cost of one main shift in the fairness score.
    pub main_shift_weighting: i64,
    /// Cost of one standby shift in the fairness score.
    pub standby_shift_weighting: i64,
    /// Multiplier on the main weighting for `Best` slots. Negative rewards them.
    pub best_weighting: i64,
    /// Solver wall-clock budget.
    pub max_time_seconds: u64,
    /// Embed each person's label in roster cells (`First_label`).
    pub debug_info: bool,
    /// Cap applied when a person's declared cap is missing or non-numeric.
    pub default_max_shifts: u32,
    /// Fairness formulation.
    pub fairness: FairnessStrategy,
    /// Weight of the preference penalty relative to the fairness term.
    pub preference_multiplier: i64,
    /// Solver search workers.
    pub num_workers: usize,
    /// Solver seed for workers beyond the first.
    pub seed: Option<u64>,
}

impl Default for RotaConfig {
    fn default() -> Self {
        Self {
            days: ["Mon", "Tue", "Wed", "Thur", "Fri", "Sat", "Sun"]
                .map(String::from)
                .to_vec(),
            periods: ["am", "pm"].map(String::from).to_vec(),
            num_main_workers: 9,
            num_standby_workers: 3,
            main_shift_weighting: 3,
            standby_shift_weighting: 2,
            best_weighting: -1,
            max_time_seconds: 900,
            debug_info: true,
            default_max_shifts: 5,
            fairness: FairnessStrategy::default(),
            preference_multiplier: 10,
            num_workers: 1,
            seed: None,
        }
    }
}

impl RotaConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_days(mut self, days: &[&str]) -> Self {
        self.days = days.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_periods(mut self, periods: &[&str]) -> Self {
        self.periods = periods.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_staffing(mut self, main: u32, standby: u32) -> Self {
        self.num_main_workers = main;
        self.num_standby_workers = standby;
        self
    }

    pub fn with_weights(mut self, main: i64, standby: i64) -> Self {
        self.main_shift_weighting = main;
        self.standby_shift_weighting = standby;
        self
    }

    pub fn with_best_weighting(mut self, w: i64) -> Self {
        self.best_weighting = w;
        self
    }

    pub fn with_fairness(mut self, strategy: FairnessStrategy) -> Self {
        self.fairness = strategy;
        self
    }

    pub fn with_max_time_seconds(mut self, secs: u64) -> Self {
        self.max_time_seconds = secs;
        self
    }

    pub fn with_debug_info(mut self, on: bool) -> Self {
        self.debug_info = on;
        self
    }

    pub fn with_default_max_shifts(mut self, cap: u32) -> Self {
        self.default_max_shifts = cap;
        self
    }

    pub fn with_preference_multiplier(mut self, m: i64) -> Self {
        self.preference_multiplier = m;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.days.is_empty() {
            return Err("at least one day is required".into());
        }
        if self.periods.is_empty() {
            return Err("at least one period is required".into());
        }
        if self.main_shift_weighting < 1 {
            return Err(format!(
                "main_shift_weighting must be >= 1, got {}",
                self.main_shift_weighting
            ));
        }
        if self.standby_shift_weighting < 1 {
            return Err(format!(
                "standby_shift_weighting must be >= 1, got {}",
                self.standby_shift_weighting
            ));
        }
        if self.preference_multiplier < 0 {
            return Err(format!(
                "preference_multiplier must be non-negative, got {}",
                self.preference_multiplier
            ));
        }
        if self.max_time_seconds == 0 {
            return Err("max_time_seconds must be positive".into());
        }
        if self.num_workers == 0 {
            return Err("num_workers must be at least 1".into());
        }
        Ok(())
    }

    /// Number of slots in the weekly cycle.
    pub fn slot_count(&self) -> usize {
        self.days.len() * self.periods.len()
    }

    /// All slots, day-major.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.days.len())
            .flat_map(move |d| (0..self.periods.len()).map(move |t| Slot::new(d, t)))
    }

    /// Column key for a slot, e.g. `Mon_am`.
    pub fn slot_key(&self, slot: Slot) -> String {
        format!("{}_{}", self.days[slot.day], self.periods[slot.period])
    }

    /// Human-readable slot name, e.g. `Mon am`.
    pub fn slot_title(&self, slot: Slot) -> String {
        format!("{} {}", self.days[slot.day], self.periods[slot.period])
    }

    /// Solver settings derived from the time budget and worker options.
    pub fn solver_config(&self) -> SolverConfig {
        let mut config = SolverConfig::default()
            .with_time_limit_ms(self.max_time_seconds.saturating_mul(1000) as i64)
            .with_num_workers(self.num_workers);
        config.seed = self.seed;
        config
    }
}
