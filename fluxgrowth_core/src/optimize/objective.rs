//! Provides struct for representing an optimization problem's objective
use crate::optimize::expression::LinearExpression;
use crate::optimize::variable::VariableHandle;

/// Represents the Objective of an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Terms included in the objective (See [`ObjectiveTerm`])
    pub(crate) terms: Vec<ObjectiveTerm>,
    /// Constant offset, only affects the reported objective value
    pub(crate) constant: f64,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    pub(crate) sense: ObjectiveSense,
}

impl Objective {
    /// Create a new objective from a linear expression
    pub fn new(expression: LinearExpression, sense: ObjectiveSense) -> Self {
        Self {
            terms: expression
                .terms()
                .map(|(var, coef)| ObjectiveTerm::new_linear(var, coef))
                .collect(),
            constant: expression.constant(),
            sense,
        }
    }

    /// Change the sense of the objective
    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    /// Sense of the objective
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Terms of the objective
    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    /// Constant offset of the objective
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Get the variables referenced by the objective
    pub fn get_variables(&self) -> impl Iterator<Item = VariableHandle> + '_ {
        self.terms.iter().map(|t| t.var)
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

/// A linear term in the objective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveTerm {
    /// Variable in objective term
    pub var: VariableHandle,
    /// Coefficient for linear term
    pub coef: f64,
}

impl ObjectiveTerm {
    /// Create a new linear objective term
    pub fn new_linear(var: VariableHandle, coef: f64) -> Self {
        ObjectiveTerm { var, coef }
    }
}
