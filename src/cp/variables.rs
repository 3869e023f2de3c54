//! CP variable types.

/// Handle to a variable registered in a [`CpModel`](super::CpModel).
///
/// Handles are dense indices handed out by the model in declaration order,
/// so two declarations never alias the same variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the model's declaration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Kind of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// 0/1 decision.
    Bool,
    /// Integer with an explicit domain.
    Int,
}

/// An integer variable with a domain [min, max].
#[derive(Debug, Clone)]
pub struct IntVar {
    /// Variable name (debugging label, stable within a model).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
}

impl IntVar {
    /// Creates a new integer variable with the given bounds.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }
}

/// A boolean variable (true/false decision).
#[derive(Debug, Clone)]
pub struct BoolVar {
    /// Variable name.
    pub name: String,
}

impl BoolVar {
    /// Creates a new boolean variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A variable as stored inside a model: name, kind, and initial domain.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Debugging label.
    pub name: String,
    /// Boolean or integer.
    pub kind: VarKind,
    /// Lower bound of the initial domain.
    pub min: i64,
    /// Upper bound of the initial domain.
    pub max: i64,
}

impl From<IntVar> for Variable {
    fn from(var: IntVar) -> Self {
        Self {
            name: var.name,
            kind: VarKind::Int,
            min: var.min,
            max: var.max,
        }
    }
}

impl From<BoolVar> for Variable {
    fn from(var: BoolVar) -> Self {
        Self {
            name: var.name,
            kind: VarKind::Bool,
            min: 0,
            max: 1,
        }
    }
}
