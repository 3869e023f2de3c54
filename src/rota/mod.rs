//! Weekly shift rota assignment.
//!
//! Turns a roster of people, their per-slot availability and a
//! [`RotaConfig`] into a CP model, solves it with any [`CpSolver`] and
//! reads the result back as per-slot rosters and per-person totals.
//!
//! # Pipeline
//!
//! 1. [`RotaProblem`]: people plus an [`AvailabilityMatrix`] of
//!    normalized [`Preference`] labels
//! 2. [`RotaCpBuilder`]: a [`VariableFabric`] of booleans per
//!    (person, slot, role), hard [`constraints`] and the fairness
//!    [`objective`]
//! 3. [`CpSolver::solve`] under the configured time budget
//! 4. [`aggregate()`] folds true assignments into a [`Roster`];
//!    [`report`] renders it as tab-separated text
//!
//! [`RotaRunner`] runs steps 2 to 4 and maps solver statuses onto
//! [`RotaError`](crate::error::RotaError).
//!
//! [`CpSolver`]: crate::cp::CpSolver
//! [`CpSolver::solve`]: crate::cp::CpSolver::solve
//!
//! # References
//!
//! - Burke, De Causmaecker, Vanden Berghe & Van Landeghem (2004),
//!   "The State of the Art of Nurse Rostering"

pub mod aggregate;
mod availability;
mod builder;
mod config;
pub mod constraints;
mod fabric;
pub mod objective;
pub mod report;
mod runner;
mod types;

pub use aggregate::{aggregate, PersonSummary, Roster, SlotRoster};
pub use availability::{AvailabilityMatrix, NormalizationWarning, Preference};
pub use builder::{RotaCpBuilder, RotaModel};
pub use config::{FairnessStrategy, RotaConfig};
pub use fabric::{Assignment, VariableFabric};
pub use objective::ObjectiveTerms;
pub use runner::{RotaOutcome, RotaRunner, SolveQuality};
pub use types::{Person, Role, RotaProblem, Slot};
