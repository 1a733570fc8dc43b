//! Module for constructing and solving optimization problems

pub mod constraint;
pub mod expression;
pub mod lp_format;
pub mod objective;
pub mod problem;
pub mod solvers;
pub mod variable;

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimize::expression::LinearExpression;
use crate::optimize::variable::{ProblemId, VariableHandle};

/// Struct representing the solution to an optimization problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSolution {
    /// The status of the optimization problem, representing if the optimization was
    /// completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Values of the variables at the optimum,
    ///
    /// Some(IndexMap), keyed by variable id, with values corresponding to variable
    /// values at optimum if the problem could be solved, None otherwise. The map
    /// preserves the declaration order of the variables.
    pub variable_values: Option<IndexMap<String, f64>>,
    /// Values of the dual variables at the optimum
    ///
    /// Some(IndexMap), keyed by constraint id, with values corresponding to dual
    /// variable values at optimum if the problem could be solved, and the solver
    /// supports retrieving the dual values, None otherwise
    pub dual_values: Option<IndexMap<String, f64>>,
    /// Problem the solution belongs to, set once the solution leaves the solver
    #[serde(skip)]
    pub(crate) problem: Option<ProblemId>,
}

impl ProblemSolution {
    /// Create a solution carrying only a status, for outcomes without values
    pub fn from_status(status: OptimizationStatus) -> Self {
        Self {
            status,
            objective_value: None,
            variable_values: None,
            dual_values: None,
            problem: None,
        }
    }

    /// True if variable values can be read from this solution
    pub fn has_values(&self) -> bool {
        self.status.is_optimal() && self.variable_values.is_some()
    }

    /// Value of a single variable at the optimum
    pub fn value(&self, variable: VariableHandle) -> Result<f64, SolutionError> {
        let values = self.values()?;
        if let Some(problem) = self.problem {
            if problem != variable.problem {
                return Err(SolutionError::ForeignVariable);
            }
        }
        values
            .get_index(variable.index)
            .map(|(_, value)| *value)
            .ok_or(SolutionError::ForeignVariable)
    }

    /// Value of a single variable at the optimum, by id
    pub fn value_by_id(&self, id: &str) -> Result<f64, SolutionError> {
        self.values()?
            .get(id)
            .copied()
            .ok_or_else(|| SolutionError::UnknownVariable(id.to_string()))
    }

    /// Evaluate a linear expression at the optimum
    pub fn evaluate(&self, expression: &LinearExpression) -> Result<f64, SolutionError> {
        expression.evaluate_with(|var| self.value(var))
    }

    /// Evaluate `numerator / denominator` at the optimum
    ///
    /// A denominator of zero is an error rather than an infinite or NaN result, it
    /// signals a degenerate optimum (for example no glucose uptake).
    pub fn ratio(
        &self,
        numerator: &LinearExpression,
        denominator: &LinearExpression,
    ) -> Result<f64, SolutionError> {
        let denominator_value = self.evaluate(denominator)?;
        if denominator_value.abs() <= f64::EPSILON {
            return Err(SolutionError::DivisionByZero);
        }
        Ok(self.evaluate(numerator)? / denominator_value)
    }

    fn values(&self) -> Result<&IndexMap<String, f64>, SolutionError> {
        match (&self.variable_values, self.status.is_optimal()) {
            (Some(values), true) => Ok(values),
            _ => Err(SolutionError::NoSolution {
                status: self.status,
            }),
        }
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationStatus {
    /// Problem has not yet attempted to be optimized
    Unoptimized,
    /// Problem has been optimized
    Optimal,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// An approximate solution has been found
    AlmostOptimal,
    /// A numerical error occurred during solving
    NumericalError,
    /// The solver hit the maximum allowed iterations, or max time, or made insufficient progress
    SolverHalted,
}

impl OptimizationStatus {
    /// True for statuses whose variable values can be read
    pub fn is_optimal(&self) -> bool {
        matches!(
            self,
            OptimizationStatus::Optimal | OptimizationStatus::AlmostOptimal
        )
    }
}

impl Display for OptimizationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OptimizationStatus::Unoptimized => "Not Solved",
            OptimizationStatus::Optimal => "Optimal",
            OptimizationStatus::Unbounded => "Unbounded",
            OptimizationStatus::Infeasible => "Infeasible",
            OptimizationStatus::AlmostOptimal => "Almost Optimal",
            OptimizationStatus::NumericalError => "Undefined",
            OptimizationStatus::SolverHalted => "Halted",
        };
        write!(f, "{}", label)
    }
}

/// Errors when reading values from a solution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolutionError {
    /// Values were requested from a problem that was not solved to optimality
    #[error("No solution available, optimization status is {status}")]
    NoSolution {
        /// Status of the solve that produced no values
        status: OptimizationStatus,
    },
    /// The variable handle was issued by another problem
    #[error("Tried to read a variable that is not part of the solved problem")]
    ForeignVariable,
    /// No variable with this id exists in the solution
    #[error("No variable with id {0} in the solution")]
    UnknownVariable(String),
    /// A ratio was computed with a denominator equal to zero
    #[error("Division by a zero valued flux expression")]
    DivisionByZero,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution_with(values: &[(&str, f64)]) -> (ProblemSolution, ProblemId) {
        let problem = ProblemId::next();
        let solution = ProblemSolution {
            status: OptimizationStatus::Optimal,
            objective_value: Some(1.),
            variable_values: Some(
                values
                    .iter()
                    .map(|(id, value)| (id.to_string(), *value))
                    .collect(),
            ),
            dual_values: None,
            problem: Some(problem),
        };
        (solution, problem)
    }

    #[test]
    fn read_values() {
        let (solution, problem) = solution_with(&[("hxt", 15.), ("pgi", 1.5)]);
        let hxt = VariableHandle { problem, index: 0 };
        let pgi = VariableHandle { problem, index: 1 };
        assert!((solution.value(hxt).unwrap() - 15.).abs() < 1e-25);
        assert!((solution.value_by_id("pgi").unwrap() - 1.5).abs() < 1e-25);
        assert!((solution.evaluate(&(2. * pgi + hxt)).unwrap() - 18.).abs() < 1e-12);
        assert!((solution.ratio(&pgi.into(), &hxt.into()).unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn ratio_with_zero_denominator() {
        let (solution, problem) = solution_with(&[("hxt", 0.), ("pgk", 4.)]);
        let hxt = VariableHandle { problem, index: 0 };
        let pgk = VariableHandle { problem, index: 1 };
        assert_eq!(
            solution.ratio(&pgk.into(), &hxt.into()),
            Err(SolutionError::DivisionByZero)
        );
    }

    #[test]
    fn foreign_handle_rejected() {
        let (solution, _) = solution_with(&[("hxt", 15.)]);
        let other = VariableHandle {
            problem: ProblemId::next(),
            index: 0,
        };
        assert_eq!(solution.value(other), Err(SolutionError::ForeignVariable));
    }

    #[test]
    fn no_values_without_optimum() {
        let solution = ProblemSolution::from_status(OptimizationStatus::Infeasible);
        assert!(!solution.has_values());
        assert_eq!(
            solution.value_by_id("hxt"),
            Err(SolutionError::NoSolution {
                status: OptimizationStatus::Infeasible
            })
        );
    }

    #[test]
    fn serializes_values_by_id() {
        let (solution, _) = solution_with(&[("hxt", 15.), ("pgi", 1.5)]);
        let json = serde_json::to_value(&solution).unwrap();
        assert_eq!(json["status"], "Optimal");
        assert_eq!(json["variable_values"]["hxt"], 15.);
    }
}
