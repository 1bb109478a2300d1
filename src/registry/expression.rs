//! Linear expressions and constraints over model variables.
use indexmap::IndexMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A decision variable in the model.
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(pub(super) usize);

impl Variable {
    /// The column index of this variable
    pub fn index(self) -> usize {
        self.0
    }
}

/// The lower and upper bounds of a variable
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Lower bound (may be negative infinity)
    pub lower: f64,
    /// Upper bound (may be infinity)
    pub upper: f64,
}

impl Bounds {
    /// Create new [`Bounds`]
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// A variable which cannot be negative
    pub fn non_negative() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    /// A variable without any bounds
    pub fn free() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Whether `value` lies within the bounds, allowing for a tolerance
    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.lower - tolerance && value <= self.upper + tolerance
    }
}

/// A linear combination of variables plus a constant
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearExpr {
    terms: IndexMap<Variable, f64>,
    constant: f64,
}

impl LinearExpr {
    /// An expression which is identically zero
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant expression
    pub fn constant(value: f64) -> Self {
        Self {
            terms: IndexMap::new(),
            constant: value,
        }
    }

    /// Add `coeff * var` to the expression, merging with any existing term for `var`
    pub fn add_term(&mut self, var: Variable, coeff: f64) {
        let entry = self.terms.entry(var).or_insert(0.0);
        *entry += coeff;
        if *entry == 0.0 {
            self.terms.shift_remove(&var);
        }
    }

    /// The constant part of the expression
    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    /// Iterate over the variables and their coefficients
    pub fn iter_terms(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.terms.iter().map(|(var, coeff)| (*var, *coeff))
    }

    /// The coefficient of `var` in the expression (zero if absent)
    pub fn coefficient(&self, var: Variable) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    /// Whether the expression contains no variables
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate the expression given the values of all the variables, indexed by column
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coeff)| coeff * values[var.0])
            .sum::<f64>()
            + self.constant
    }
}

impl From<Variable> for LinearExpr {
    fn from(var: Variable) -> Self {
        let mut expr = Self::zero();
        expr.add_term(var, 1.0);
        expr
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl AddAssign<&LinearExpr> for LinearExpr {
    fn add_assign(&mut self, rhs: &LinearExpr) {
        for (var, coeff) in rhs.iter_terms() {
            self.add_term(var, coeff);
        }
        self.constant += rhs.constant;
    }
}

impl AddAssign for LinearExpr {
    fn add_assign(&mut self, rhs: LinearExpr) {
        *self += &rhs;
    }
}

impl SubAssign<&LinearExpr> for LinearExpr {
    fn sub_assign(&mut self, rhs: &LinearExpr) {
        for (var, coeff) in rhs.iter_terms() {
            self.add_term(var, -coeff);
        }
        self.constant -= rhs.constant;
    }
}

impl SubAssign for LinearExpr {
    fn sub_assign(&mut self, rhs: LinearExpr) {
        *self -= &rhs;
    }
}

impl<T: Into<LinearExpr>> Add<T> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: T) -> LinearExpr {
        self += rhs.into();
        self
    }
}

impl<T: Into<LinearExpr>> Sub<T> for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: T) -> LinearExpr {
        self -= rhs.into();
        self
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, rhs: f64) -> LinearExpr {
        if rhs == 0.0 {
            return LinearExpr::zero();
        }

        for coeff in self.terms.values_mut() {
            *coeff *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl Mul<f64> for &LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> LinearExpr {
        self.clone() * rhs
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1.0
    }
}

impl std::iter::Sum for LinearExpr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(LinearExpr::zero(), |acc, expr| acc + expr)
    }
}

impl<'a> std::iter::Sum<&'a LinearExpr> for LinearExpr {
    fn sum<I: Iterator<Item = &'a LinearExpr>>(iter: I) -> Self {
        iter.fold(LinearExpr::zero(), |mut acc, expr| {
            acc += expr;
            acc
        })
    }
}

/// The relation between the two sides of a constraint
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Relation {
    /// Left-hand side equals right-hand side
    #[strum(to_string = "==")]
    Eq,
    /// Left-hand side is less than or equal to right-hand side
    #[strum(to_string = "<=")]
    Le,
    /// Left-hand side is greater than or equal to right-hand side
    #[strum(to_string = ">=")]
    Ge,
}

/// A linear constraint, stored as `expr <relation> 0`
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    expr: LinearExpr,
    relation: Relation,
}

impl Constraint {
    fn new<L: Into<LinearExpr>, R: Into<LinearExpr>>(lhs: L, relation: Relation, rhs: R) -> Self {
        Self {
            expr: lhs.into() - rhs.into(),
            relation,
        }
    }

    /// `lhs == rhs`
    pub fn eq<L: Into<LinearExpr>, R: Into<LinearExpr>>(lhs: L, rhs: R) -> Self {
        Self::new(lhs, Relation::Eq, rhs)
    }

    /// `lhs <= rhs`
    pub fn le<L: Into<LinearExpr>, R: Into<LinearExpr>>(lhs: L, rhs: R) -> Self {
        Self::new(lhs, Relation::Le, rhs)
    }

    /// `lhs >= rhs`
    pub fn ge<L: Into<LinearExpr>, R: Into<LinearExpr>>(lhs: L, rhs: R) -> Self {
        Self::new(lhs, Relation::Ge, rhs)
    }

    /// The constraint's body (`lhs - rhs`)
    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    /// The relation between the body and zero
    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// The variable part of the body must lie between these bounds
    pub fn row_bounds(&self) -> Bounds {
        let rhs = -self.expr.constant;
        match self.relation {
            Relation::Eq => Bounds::new(rhs, rhs),
            Relation::Le => Bounds::new(f64::NEG_INFINITY, rhs),
            Relation::Ge => Bounds::new(rhs, f64::INFINITY),
        }
    }

    /// Whether the constraint holds for the given variable values, allowing for a tolerance
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let value = self.expr.evaluate(values);
        match self.relation {
            Relation::Eq => value.abs() <= tolerance,
            Relation::Le => value <= tolerance,
            Relation::Ge => value >= -tolerance,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (var, coeff)) in self.expr.iter_terms().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{coeff} x{}", var.0)?;
        }
        if self.expr.is_constant() {
            write!(f, "0")?;
        }
        write!(f, " {} {}", self.relation, -self.expr.constant)
    }
}
