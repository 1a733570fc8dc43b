//! Provides struct for representing a constraint in an optimization problem
use std::fmt::{Display, Formatter};

use crate::optimize::expression::LinearExpression;
use crate::optimize::variable::VariableHandle;

/// Relation between the left and right hand side of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `lhs == rhs`
    Equal,
    /// `lhs <= rhs`
    LessOrEqual,
    /// `lhs >= rhs`
    GreaterOrEqual,
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Equal => write!(f, "="),
            Relation::LessOrEqual => write!(f, "<="),
            Relation::GreaterOrEqual => write!(f, ">="),
        }
    }
}

/// Represents a linear constraint in an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Represents an equality constraint, where `terms` = `equals`
    Equality {
        /// Identifier of the constraint (for balances, the metabolite id)
        id: String,
        /// Linear terms which are added together, see [`ConstraintTerm`] for more
        terms: Vec<ConstraintTerm>,
        /// The right hand side of the equality constraint
        equals: f64,
    },
    /// Represents an inequality constraint, `lower_bound` <= `terms` <= `upper_bound`
    ///
    /// One sided inequalities use an infinite bound on the other side.
    Inequality {
        /// Identifier of the constraint
        id: String,
        /// Linear terms which are added together, see [`ConstraintTerm`] for more
        terms: Vec<ConstraintTerm>,
        /// The lowest value the sum of the terms can take
        lower_bound: f64,
        /// The highest value the sum of the terms can take
        upper_bound: f64,
    },
}

impl Constraint {
    /// Create a constraint `expression relation rhs`
    ///
    /// The constant of `expression` is moved to the right hand side.
    ///
    /// # Examples
    /// ```rust
    /// use fluxgrowth_core::optimize::constraint::{Constraint, Relation};
    /// use fluxgrowth_core::optimize::problem::Problem;
    /// let mut problem = Problem::new();
    /// let hxt = problem.declare_variable("hxt", 0., 15.).unwrap();
    /// let hxk = problem.declare_variable("hxk", 0., 15.).unwrap();
    /// // Glucose balance, hxt - hxk = 0
    /// let glc = Constraint::from_expression("GLC", hxt - hxk, Relation::Equal, 0.);
    /// assert!(glc.is_equality());
    /// ```
    pub fn from_expression(
        id: &str,
        expression: LinearExpression,
        relation: Relation,
        rhs: f64,
    ) -> Self {
        let rhs = rhs - expression.constant();
        let terms = Constraint::collect_terms(&expression);
        match relation {
            Relation::Equal => Constraint::Equality {
                id: id.to_string(),
                terms,
                equals: rhs,
            },
            Relation::LessOrEqual => Constraint::Inequality {
                id: id.to_string(),
                terms,
                lower_bound: f64::NEG_INFINITY,
                upper_bound: rhs,
            },
            Relation::GreaterOrEqual => Constraint::Inequality {
                id: id.to_string(),
                terms,
                lower_bound: rhs,
                upper_bound: f64::INFINITY,
            },
        }
    }

    /// Create a ranged constraint `lower_bound <= expression <= upper_bound`
    pub fn new_range(
        id: &str,
        expression: LinearExpression,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Self {
        let offset = expression.constant();
        Constraint::Inequality {
            id: id.to_string(),
            terms: Constraint::collect_terms(&expression),
            lower_bound: lower_bound - offset,
            upper_bound: upper_bound - offset,
        }
    }

    /// Get the id of the constraint
    pub fn get_id(&self) -> &str {
        match self {
            Constraint::Equality { id, .. } | Constraint::Inequality { id, .. } => id,
        }
    }

    /// Get the terms of the constraint
    pub fn get_terms(&self) -> &[ConstraintTerm] {
        match self {
            Constraint::Equality { terms, .. } | Constraint::Inequality { terms, .. } => terms,
        }
    }

    /// Get the variables referenced by the constraint
    pub fn get_variables(&self) -> impl Iterator<Item = VariableHandle> + '_ {
        self.get_terms().iter().map(|t| t.variable)
    }

    /// Whether this is an equality constraint
    pub fn is_equality(&self) -> bool {
        matches!(self, Constraint::Equality { .. })
    }

    /// The (lower, upper) interval the terms must lie in
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Constraint::Equality { equals, .. } => (*equals, *equals),
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => (*lower_bound, *upper_bound),
        }
    }

    /// Value of the terms, given a slice of variable values indexed like the problem
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.get_terms()
            .iter()
            .map(|t| t.coefficient * values[t.variable.index])
            .sum()
    }

    /// Distance of `activity` outside the interval of the constraint, zero if satisfied
    pub fn violation(&self, activity: f64) -> f64 {
        let (lower, upper) = self.bounds();
        if activity < lower {
            lower - activity
        } else if activity > upper {
            activity - upper
        } else {
            0.
        }
    }

    fn collect_terms(expression: &LinearExpression) -> Vec<ConstraintTerm> {
        expression
            .terms()
            .map(|(variable, coefficient)| ConstraintTerm {
                variable,
                coefficient,
            })
            .collect()
    }
}

/// Represents a single term in a constraint, specifically
/// represents the multiplication of the `variable` by the `coefficient`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintTerm {
    /// Handle of the variable
    pub variable: VariableHandle,
    /// The coefficient for the variable
    pub coefficient: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::variable::ProblemId;

    fn handles() -> (VariableHandle, VariableHandle) {
        let problem = ProblemId::next();
        (
            VariableHandle { problem, index: 0 },
            VariableHandle { problem, index: 1 },
        )
    }

    #[test]
    fn relations_map_to_bounds() {
        let (x, y) = handles();
        let eq = Constraint::from_expression("eq", x + y, Relation::Equal, 4.);
        assert_eq!(eq.bounds(), (4., 4.));
        let le = Constraint::from_expression("le", x + y, Relation::LessOrEqual, 4.);
        assert_eq!(le.bounds(), (f64::NEG_INFINITY, 4.));
        let ge = Constraint::from_expression("ge", x + y, Relation::GreaterOrEqual, 4.);
        assert_eq!(ge.bounds(), (4., f64::INFINITY));
    }

    #[test]
    fn constant_moves_to_rhs() {
        let (x, _) = handles();
        let cons = Constraint::from_expression("shifted", x + 3., Relation::LessOrEqual, 10.);
        assert_eq!(cons.bounds(), (f64::NEG_INFINITY, 7.));
        let range = Constraint::new_range("range", x - 1., 0., 5.);
        assert_eq!(range.bounds(), (1., 6.));
    }

    #[test]
    fn activity_and_violation() {
        let (x, y) = handles();
        let cons = Constraint::from_expression("NADH", 3. * x - y, Relation::Equal, 0.);
        let activity = cons.activity(&[1., 3.]);
        assert!(activity.abs() < 1e-12);
        assert!(cons.violation(activity) < 1e-12);
        assert!((cons.violation(cons.activity(&[1., 1.])) - 2.).abs() < 1e-12);
        assert_eq!(cons.get_id(), "NADH");
        assert_eq!(cons.get_variables().collect::<Vec<_>>(), vec![x, y]);
    }
}
