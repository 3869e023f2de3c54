//! Linear expressions over model variables.

use super::variables::VarId;

/// A linear expression `sum(coef_i * x_i) + constant` with integer coefficients.
///
/// # Examples
///
/// ```
/// use u_rota::cp::{CpModel, LinearExpr};
///
/// let mut model = CpModel::new("example");
/// let x = model.new_bool_var("x");
/// let y = model.new_bool_var("y");
///
/// let expr = LinearExpr::new().term(x, 3).term(y, 2).constant(-1);
/// assert_eq!(expr.evaluate(&[1, 1]), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    /// (variable, coefficient) pairs. A variable may appear more than once.
    pub terms: Vec<(VarId, i64)>,
    /// Constant offset.
    pub constant: i64,
}

impl LinearExpr {
    /// Creates the empty expression (value 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables, each with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        vars.into_iter().map(|v| (v, 1)).collect()
    }

    /// Builder: appends `coef * var`.
    pub fn term(mut self, var: VarId, coef: i64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Builder: adds to the constant offset.
    pub fn constant(mut self, value: i64) -> Self {
        self.constant += value;
        self
    }

    /// Appends `coef * var` in place.
    pub fn add_term(&mut self, var: VarId, coef: i64) {
        self.terms.push((var, coef));
    }

    /// Appends every term (and the constant) of `other`.
    pub fn add_expr(&mut self, other: &LinearExpr) {
        self.terms.extend_from_slice(&other.terms);
        self.constant += other.constant;
    }

    /// Multiplies every coefficient and the constant by `factor`.
    pub fn scaled(mut self, factor: i64) -> Self {
        for (_, coef) in &mut self.terms {
            *coef *= factor;
        }
        self.constant *= factor;
        self
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|&(_, c)| c == 0)
    }

    /// Evaluates the expression against a dense assignment indexed by [`VarId::index`].
    pub fn evaluate(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values[v.index()])
            .sum::<i64>()
            + self.constant
    }

    /// Total coefficient of `var` across all of its occurrences.
    pub fn coefficient(&self, var: VarId) -> i64 {
        self.terms
            .iter()
            .filter(|&&(v, _)| v == var)
            .map(|&(_, c)| c)
            .sum()
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        LinearExpr::new().term(var, 1)
    }
}

impl FromIterator<(VarId, i64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, i64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
            constant: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_and_evaluate() {
        let expr = LinearExpr::sum([VarId(0), VarId(2)]);
        assert_eq!(expr.evaluate(&[1, 5, 1]), 2);
    }

    #[test]
    fn test_scaled() {
        let expr = LinearExpr::new().term(VarId(0), 2).constant(3).scaled(-2);
        assert_eq!(expr.terms, vec![(VarId(0), -4)]);
        assert_eq!(expr.constant, -6);
    }

    #[test]
    fn test_coefficient_merges_repeats() {
        let expr = LinearExpr::new()
            .term(VarId(1), 3)
            .term(VarId(1), -1)
            .term(VarId(0), 7);
        assert_eq!(expr.coefficient(VarId(1)), 2);
        assert_eq!(expr.coefficient(VarId(4)), 0);
    }

    #[test]
    fn test_add_expr() {
        let mut a = LinearExpr::new().term(VarId(0), 1).constant(1);
        let b = LinearExpr::new().term(VarId(1), 2).constant(2);
        a.add_expr(&b);
        assert_eq!(a.terms.len(), 2);
        assert_eq!(a.constant, 3);
        assert!(!a.is_constant());
        assert!(LinearExpr::new().constant(4).is_constant());
    }
}
