//! Weekly shift rota assignment on a constraint-programming core.
//!
//! Assigns people to main and standby roles across a weekly grid of
//! (day, period) slots:
//!
//! - **CP (Constraint Programming)**: Domain-agnostic modeling layer with
//!   boolean and integer variables, linear and abs/product/max equality
//!   constraints, and a bundled branch-and-bound solver.
//! - **Rota**: Builds the staffing model (exact headcounts, one shift per
//!   person per day, shift caps, availability), a fairness objective with a
//!   preference penalty, and aggregates solutions into rosters and totals.
//! - **Input**: CSV ingestion of people and availability with label
//!   normalization.
//!
//! # Architecture
//!
//! The rota layer only talks to [`cp::CpModel`] and the [`cp::CpSolver`]
//! trait, so any backend that implements the trait can replace the bundled
//! search without touching model construction.
//!
//! # Example
//!
//! ```
//! use u_rota::rota::{AvailabilityMatrix, Person, Preference, RotaConfig, RotaProblem, RotaRunner};
//!
//! let config = RotaConfig::default()
//!     .with_days(&["Mon"])
//!     .with_staffing(1, 0)
//!     .with_max_time_seconds(5);
//! let matrix = AvailabilityMatrix::from_rows(1, 2, vec![vec![Preference::Yes; 2]; 2]);
//! let people = vec![Person::new("Ann", "", "", 1), Person::new("Bob", "", "", 1)];
//! let problem = RotaProblem::new(people, matrix).unwrap();
//!
//! let outcome = RotaRunner::run(&problem, &config).unwrap();
//! assert_eq!(outcome.roster.people[0].main, 1);
//! ```

pub mod cp;
pub mod error;
pub mod input;
pub mod logging;
pub mod rota;
