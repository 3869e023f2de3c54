//! Constraint Programming (CP) framework.
//!
//! Provides a domain-agnostic model for expressing constrained optimization
//! problems over boolean and integer variables.
//!
//! # Key Components
//!
//! - **Variables**: [`BoolVar`], [`IntVar`], addressed through [`VarId`] handles
//! - **Expressions**: [`LinearExpr`]: integer-weighted sums of variables
//! - **Constraints**: [`Constraint`]: linear relations, abs/product/max equalities
//! - **Model**: [`CpModel`]: container for variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait: interface for solver implementations,
//!   with [`BranchAndBoundSolver`] as the bundled backend
//!
//! # Design
//!
//! Consumers build a [`CpModel`] and hand it to any [`CpSolver`]. The modeling
//! layer never depends on a particular backend, so OR-Tools, an ILP solver, or
//! the bundled search can be swapped without touching model construction.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod expr;
mod model;
mod propagate;
mod search;
mod solver;
mod variables;

pub use expr::LinearExpr;
pub use model::{Comparison, Constraint, CpModel, Objective};
pub use search::BranchAndBoundSolver;
pub use solver::{CpSolution, CpSolver, SolverConfig, SolverStatus};
pub use variables::{BoolVar, IntVar, VarId, VarKind, Variable};
