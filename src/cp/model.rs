//! CP model definition.

use super::expr::LinearExpr;
use super::variables::{BoolVar, IntVar, VarId, VarKind, Variable};

/// Relation between a linear expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `expr == rhs`
    Eq,
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
}

impl Comparison {
    /// Whether `lhs <cmp> rhs` holds.
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Ge => lhs >= rhs,
        }
    }
}

/// A constraint in the CP model.
///
/// The set mirrors what common CP-SAT / ILP front-ends accept: linear
/// relations plus the non-linear equalities needed to express absolute
/// deviations, squares, and bottlenecks without native multiplication of
/// decision variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Linear relation: `expr <cmp> rhs`.
    Linear {
        /// Left-hand side.
        expr: LinearExpr,
        /// Relation.
        cmp: Comparison,
        /// Right-hand side constant.
        rhs: i64,
    },

    /// `target == |var|`.
    AbsEquality {
        /// Result variable.
        target: VarId,
        /// Argument variable.
        var: VarId,
    },

    /// `target == factors[0] * factors[1] * ...`.
    ///
    /// Squares are expressed by repeating a factor.
    ProductEquality {
        /// Result variable.
        target: VarId,
        /// Factors (at least one).
        factors: Vec<VarId>,
    },

    /// `target == max(vars)`.
    MaxEquality {
        /// Result variable.
        target: VarId,
        /// Candidates (at least one).
        vars: Vec<VarId>,
    },
}

impl Constraint {
    /// Variables referenced by this constraint.
    pub fn variables(&self) -> Vec<VarId> {
        match self {
            Constraint::Linear { expr, .. } => expr.terms.iter().map(|&(v, _)| v).collect(),
            Constraint::AbsEquality { target, var } => vec![*target, *var],
            Constraint::ProductEquality { target, factors } => {
                std::iter::once(*target).chain(factors.iter().copied()).collect()
            }
            Constraint::MaxEquality { target, vars } => {
                std::iter::once(*target).chain(vars.iter().copied()).collect()
            }
        }
    }

    /// Whether a complete assignment satisfies this constraint.
    pub fn is_satisfied_by(&self, values: &[i64]) -> bool {
        match self {
            Constraint::Linear { expr, cmp, rhs } => cmp.holds(expr.evaluate(values), *rhs),
            Constraint::AbsEquality { target, var } => {
                values[target.index()] == values[var.index()].abs()
            }
            Constraint::ProductEquality { target, factors } => {
                let product = factors
                    .iter()
                    .try_fold(1i64, |acc, f| acc.checked_mul(values[f.index()]));
                product == Some(values[target.index()])
            }
            Constraint::MaxEquality { target, vars } => {
                vars.iter().map(|v| values[v.index()]).max() == Some(values[target.index()])
            }
        }
    }
}

/// Objective function for the CP model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    /// Minimize a linear expression.
    Minimize(LinearExpr),
    /// Maximize a linear expression.
    Maximize(LinearExpr),
}

impl Objective {
    /// The expression being optimized.
    pub fn expr(&self) -> &LinearExpr {
        match self {
            Objective::Minimize(e) | Objective::Maximize(e) => e,
        }
    }

    /// The objective rewritten as a minimization.
    pub fn as_minimization(&self) -> LinearExpr {
        match self {
            Objective::Minimize(e) => e.clone(),
            Objective::Maximize(e) => e.clone().scaled(-1),
        }
    }
}

/// A constraint programming model.
///
/// Contains variables, constraints, and an optional objective function.
///
/// # Examples
///
/// ```
/// use u_rota::cp::{CpModel, LinearExpr};
///
/// let mut model = CpModel::new("example");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_eq(LinearExpr::sum([a, b]), 1);
/// model.minimize(LinearExpr::new().term(a, 5).term(b, 2));
/// assert!(model.validate().is_ok());
/// assert_eq!(model.variable_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Variables in declaration order, indexed by [`VarId`].
    pub variables: Vec<Variable>,
    /// Constraints.
    pub constraints: Vec<Constraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Declares a fresh boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.add_bool_var(BoolVar::new(name))
    }

    /// Declares a fresh integer variable with domain `[min, max]`.
    pub fn new_int_var(&mut self, name: impl Into<String>, min: i64, max: i64) -> VarId {
        self.add_int_var(IntVar::new(name, min, max))
    }

    /// Adds a boolean variable.
    pub fn add_bool_var(&mut self, var: BoolVar) -> VarId {
        self.push_variable(var.into())
    }

    /// Adds an integer variable.
    pub fn add_int_var(&mut self, var: IntVar) -> VarId {
        self.push_variable(var.into())
    }

    fn push_variable(&mut self, var: Variable) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(var);
        id
    }

    /// Looks up a declared variable.
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add `expr <cmp> rhs`.
    pub fn add_linear(&mut self, expr: LinearExpr, cmp: Comparison, rhs: i64) {
        self.constraints.push(Constraint::Linear { expr, cmp, rhs });
    }

    /// Convenience: add `expr == rhs`.
    pub fn add_eq(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Comparison::Eq, rhs);
    }

    /// Convenience: add `expr <= rhs`.
    pub fn add_le(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Comparison::Le, rhs);
    }

    /// Convenience: add `expr >= rhs`.
    pub fn add_ge(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Comparison::Ge, rhs);
    }

    /// Convenience: add `target == |var|`.
    pub fn add_abs_equality(&mut self, target: VarId, var: VarId) {
        self.constraints.push(Constraint::AbsEquality { target, var });
    }

    /// Convenience: add `target == product(factors)`.
    pub fn add_product_equality(&mut self, target: VarId, factors: Vec<VarId>) {
        self.constraints
            .push(Constraint::ProductEquality { target, factors });
    }

    /// Convenience: add `target == max(vars)`.
    pub fn add_max_equality(&mut self, target: VarId, vars: Vec<VarId>) {
        self.constraints.push(Constraint::MaxEquality { target, vars });
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// Convenience: minimize `expr`.
    pub fn minimize(&mut self, expr: LinearExpr) {
        self.set_objective(Objective::Minimize(expr));
    }

    /// Convenience: maximize `expr`.
    pub fn maximize(&mut self, expr: LinearExpr) {
        self.set_objective(Objective::Maximize(expr));
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced variable exists, that domains are
    /// non-empty, and that product/max constraints have operands.
    pub fn validate(&self) -> Result<(), String> {
        for var in &self.variables {
            if var.min > var.max {
                return Err(format!(
                    "empty domain for {}: [{}, {}]",
                    var.name, var.min, var.max
                ));
            }
            if var.kind == VarKind::Bool && (var.min < 0 || var.max > 1) {
                return Err(format!("boolean {} has non-0/1 domain", var.name));
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::ProductEquality { factors, .. } if factors.is_empty() => {
                    return Err("product equality without factors".into());
                }
                Constraint::MaxEquality { vars, .. } if vars.is_empty() => {
                    return Err("max equality without candidates".into());
                }
                _ => {}
            }
            self.check_ids(constraint.variables())?;
        }

        if let Some(objective) = &self.objective {
            self.check_ids(objective.expr().terms.iter().map(|&(v, _)| v))?;
        }
        Ok(())
    }

    fn check_ids(&self, ids: impl IntoIterator<Item = VarId>) -> Result<(), String> {
        for id in ids {
            if id.index() >= self.variables.len() {
                return Err(format!("undefined variable: #{}", id.index()));
            }
        }
        Ok(())
    }

    /// Whether a complete assignment satisfies every constraint and domain.
    pub fn is_satisfied_by(&self, values: &[i64]) -> bool {
        values.len() == self.variables.len()
            && self
                .variables
                .iter()
                .zip(values)
                .all(|(var, &v)| var.min <= v && v <= var.max)
            && self.constraints.iter().all(|c| c.is_satisfied_by(values))
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of boolean variables.
    pub fn bool_var_count(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.kind == VarKind::Bool)
            .count()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
