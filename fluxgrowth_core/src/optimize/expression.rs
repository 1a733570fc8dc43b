//! Linear expressions over problem variables
//!
//! Expressions are written with ordinary arithmetic on [`VariableHandle`]s, for example
//! `hxt - hxk` or `3. * tca + gapdh - etc1`. Repeated variables are merged into a single
//! term, and constants are collected separately so constraints can move them to the
//! right hand side.
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

use indexmap::IndexMap;

use crate::optimize::variable::VariableHandle;

/// A linear combination of variables plus a constant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpression {
    /// Coefficient of each variable, in the order they were first added
    terms: IndexMap<VariableHandle, f64>,
    /// Constant offset of the expression
    constant: f64,
}

impl LinearExpression {
    /// Create a new empty expression (evaluates to zero)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an expression with no variables
    pub fn from_constant(constant: f64) -> Self {
        Self {
            terms: IndexMap::new(),
            constant,
        }
    }

    /// Create an expression from a slice of (variable, coefficient) pairs
    pub fn from_terms(terms: &[(VariableHandle, f64)]) -> Self {
        let mut expression = Self::new();
        for (var, coef) in terms {
            expression.add_term(*var, *coef);
        }
        expression
    }

    /// Add `coefficient * variable` to the expression, merging with an existing term
    pub fn add_term(&mut self, variable: VariableHandle, coefficient: f64) {
        *self.terms.entry(variable).or_insert(0.) += coefficient;
    }

    /// Iterate over the (variable, coefficient) terms
    pub fn terms(&self) -> impl Iterator<Item = (VariableHandle, f64)> + '_ {
        self.terms.iter().map(|(var, coef)| (*var, *coef))
    }

    /// Coefficient of `variable`, zero if it does not appear
    pub fn coefficient(&self, variable: VariableHandle) -> f64 {
        self.terms.get(&variable).copied().unwrap_or(0.)
    }

    /// Constant part of the expression
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Number of variable terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if the expression has no variable terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate the expression, looking up variable values with `value_of`
    pub(crate) fn evaluate_with<E, F>(&self, mut value_of: F) -> Result<f64, E>
    where
        F: FnMut(VariableHandle) -> Result<f64, E>,
    {
        self.terms
            .iter()
            .try_fold(self.constant, |acc, (var, coef)| Ok(acc + coef * value_of(*var)?))
    }

    fn scale(mut self, factor: f64) -> Self {
        self.terms.values_mut().for_each(|coef| *coef *= factor);
        self.constant *= factor;
        self
    }
}

// region Conversions
impl From<VariableHandle> for LinearExpression {
    fn from(variable: VariableHandle) -> Self {
        let mut expression = LinearExpression::new();
        expression.add_term(variable, 1.);
        expression
    }
}

impl From<f64> for LinearExpression {
    fn from(constant: f64) -> Self {
        LinearExpression::from_constant(constant)
    }
}
// endregion Conversions

// region Operators
impl<T: Into<LinearExpression>> Add<T> for LinearExpression {
    type Output = LinearExpression;

    fn add(mut self, rhs: T) -> Self::Output {
        let rhs = rhs.into();
        for (var, coef) in rhs.terms {
            self.add_term(var, coef);
        }
        self.constant += rhs.constant;
        self
    }
}

impl<T: Into<LinearExpression>> Sub<T> for LinearExpression {
    type Output = LinearExpression;

    fn sub(self, rhs: T) -> Self::Output {
        let rhs: LinearExpression = rhs.into();
        self + rhs.neg()
    }
}

impl Neg for LinearExpression {
    type Output = LinearExpression;

    fn neg(self) -> Self::Output {
        self.scale(-1.)
    }
}

impl Mul<f64> for LinearExpression {
    type Output = LinearExpression;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl Mul<LinearExpression> for f64 {
    type Output = LinearExpression;

    fn mul(self, rhs: LinearExpression) -> Self::Output {
        rhs.scale(self)
    }
}

impl<T: Into<LinearExpression>> Add<T> for VariableHandle {
    type Output = LinearExpression;

    fn add(self, rhs: T) -> Self::Output {
        LinearExpression::from(self) + rhs
    }
}

impl<T: Into<LinearExpression>> Sub<T> for VariableHandle {
    type Output = LinearExpression;

    fn sub(self, rhs: T) -> Self::Output {
        LinearExpression::from(self) - rhs
    }
}

impl Neg for VariableHandle {
    type Output = LinearExpression;

    fn neg(self) -> Self::Output {
        -LinearExpression::from(self)
    }
}

impl Mul<f64> for VariableHandle {
    type Output = LinearExpression;

    fn mul(self, rhs: f64) -> Self::Output {
        LinearExpression::from(self) * rhs
    }
}

impl Mul<VariableHandle> for f64 {
    type Output = LinearExpression;

    fn mul(self, rhs: VariableHandle) -> Self::Output {
        LinearExpression::from(rhs) * self
    }
}

impl<T: Into<LinearExpression>> Sum<T> for LinearExpression {
    fn sum<I: Iterator<Item = T>>(iter: I) -> Self {
        iter.fold(LinearExpression::new(), |acc, item| acc + item)
    }
}
// endregion Operators
