//! Interface between [`Problem`](crate::optimize::problem::Problem) and the LP solver crates
#[cfg(feature = "microlp")]
pub mod microlp;

pub mod clarabel;

use indexmap::IndexMap;
use thiserror::Error;

use crate::configuration::{Configuration, SolverBackend};
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::ProblemSolution;

/// A linear programming backend
///
/// Variables and constraints are referenced by id, the solver keeps its own copy of
/// the problem so it is independent of the [`Problem`](crate::optimize::problem::Problem)
/// it was loaded from.
pub trait Solver {
    /// Add a continuous variable with the given bounds (bounds may be infinite)
    fn add_continuous_variable(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError>;

    /// Add the constraint `sum(coefficients * variables) == equals`
    fn add_equality_constraint(
        &mut self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
        equals: f64,
    ) -> Result<(), SolverError>;

    /// Add the constraint `lower_bound <= sum(coefficients * variables) <= upper_bound`
    fn add_inequality_constraint(
        &mut self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError>;

    /// Add `coefficient * variable` to the objective
    fn add_linear_objective_term(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), SolverError>;

    /// Set whether the objective is maximized or minimized
    fn set_objective_sense(&mut self, objective_sense: ObjectiveSense) -> Result<(), SolverError>;

    /// Solve the problem
    ///
    /// Infeasible and unbounded problems are reported through the status of the
    /// returned solution, an `Err` means the backend itself failed.
    fn solve(&mut self) -> Result<ProblemSolution, SolverError>;
}

/// Create the solver selected by the configuration
pub fn new_solver(configuration: &Configuration) -> Result<Box<dyn Solver>, SolverError> {
    match configuration.solver {
        SolverBackend::Clarabel => Ok(Box::new(self::clarabel::ClarabelSolver::new(
            configuration.verbose,
        ))),
        SolverBackend::Microlp => microlp_solver(),
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "microlp")] {
        fn microlp_solver() -> Result<Box<dyn Solver>, SolverError> {
            Ok(Box::new(self::microlp::MicrolpSolver::new()))
        }
    } else {
        fn microlp_solver() -> Result<Box<dyn Solver>, SolverError> {
            Err(SolverError::BackendUnavailable(SolverBackend::Microlp))
        }
    }
}

/// Errors raised by a solver backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// A constraint or objective term referenced a variable the solver does not know
    #[error("Variable {0} has not been added to the solver")]
    UnknownVariable(String),
    /// A variable was added twice
    #[error("Variable {0} was already added to the solver")]
    DuplicateVariable(String),
    /// Variables and coefficients of a constraint differ in length
    #[error("Constraint {0} has a different number of variables and coefficients")]
    MismatchedTerms(String),
    /// The requested backend was not compiled in
    #[error("The {0:?} solver backend is not enabled")]
    BackendUnavailable(SolverBackend),
    /// The backend failed for a reason of its own
    #[error("Solver backend failed: {0}")]
    Backend(String),
}

/// Problem data as staged by a backend before solving
///
/// Both backends build their native problem in one go at solve time, this is the
/// bookkeeping they share.
#[derive(Debug, Clone)]
pub(crate) struct StagedModel {
    /// Bounds of each variable, keyed by id in the order added
    pub(crate) variables: IndexMap<String, (f64, f64)>,
    /// Constraint rows
    pub(crate) constraints: Vec<StagedConstraint>,
    /// Objective coefficient of each variable, keyed by variable index
    pub(crate) objective: IndexMap<usize, f64>,
    pub(crate) sense: ObjectiveSense,
}

/// A constraint with its variables resolved to indices
#[derive(Debug, Clone)]
pub(crate) struct StagedConstraint {
    pub(crate) id: String,
    pub(crate) terms: Vec<(usize, f64)>,
    pub(crate) lower_bound: f64,
    pub(crate) upper_bound: f64,
}

impl StagedConstraint {
    pub(crate) fn is_equality(&self) -> bool {
        self.lower_bound == self.upper_bound
    }
}

impl StagedModel {
    pub(crate) fn new() -> Self {
        Self {
            variables: IndexMap::new(),
            constraints: Vec::new(),
            objective: IndexMap::new(),
            sense: ObjectiveSense::Maximize,
        }
    }

    pub(crate) fn add_variable(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError> {
        if self.variables.contains_key(id) {
            return Err(SolverError::DuplicateVariable(id.to_string()));
        }
        self.variables
            .insert(id.to_string(), (lower_bound, upper_bound));
        Ok(())
    }

    pub(crate) fn add_constraint(
        &mut self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError> {
        if variables.len() != coefficients.len() {
            return Err(SolverError::MismatchedTerms(id.to_string()));
        }
        let terms = variables
            .iter()
            .zip(coefficients)
            .map(|(var, coef)| Ok((self.variable_index(var)?, coef)))
            .collect::<Result<Vec<_>, SolverError>>()?;
        self.constraints.push(StagedConstraint {
            id: id.to_string(),
            terms,
            lower_bound,
            upper_bound,
        });
        Ok(())
    }

    pub(crate) fn add_objective_term(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), SolverError> {
        let index = self.variable_index(variable_id)?;
        *self.objective.entry(index).or_insert(0.) += coefficient;
        Ok(())
    }

    /// Objective coefficient of every variable, in variable order
    pub(crate) fn objective_coefficients(&self) -> Vec<f64> {
        (0..self.variables.len())
            .map(|index| self.objective.get(&index).copied().unwrap_or(0.))
            .collect()
    }

    /// Pair the solved values with the variable ids
    pub(crate) fn label_values(&self, values: &[f64]) -> IndexMap<String, f64> {
        self.variables
            .keys()
            .cloned()
            .zip(values.iter().copied())
            .collect()
    }

    fn variable_index(&self, id: &str) -> Result<usize, SolverError> {
        self.variables
            .get_index_of(id)
            .ok_or_else(|| SolverError::UnknownVariable(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_model_resolves_ids() {
        let mut model = StagedModel::new();
        model.add_variable("x", 0., 10.).unwrap();
        model.add_variable("y", 0., f64::INFINITY).unwrap();
        model
            .add_constraint("c", vec!["y", "x"], vec![1., 2.], f64::NEG_INFINITY, 4.)
            .unwrap();
        model.add_objective_term("y", 3.).unwrap();
        assert_eq!(model.constraints[0].terms, vec![(1, 1.), (0, 2.)]);
        assert_eq!(model.objective_coefficients(), vec![0., 3.]);
        assert!(!model.constraints[0].is_equality());
    }

    #[test]
    fn staged_model_rejects_bad_input() {
        let mut model = StagedModel::new();
        model.add_variable("x", 0., 10.).unwrap();
        assert_eq!(
            model.add_variable("x", 0., 1.),
            Err(SolverError::DuplicateVariable("x".to_string()))
        );
        assert_eq!(
            model.add_constraint("c", vec!["z"], vec![1.], 0., 0.),
            Err(SolverError::UnknownVariable("z".to_string()))
        );
        assert_eq!(
            model.add_constraint("c", vec!["x"], vec![1., 2.], 0., 0.),
            Err(SolverError::MismatchedTerms("c".to_string()))
        );
    }

    #[test]
    fn clarabel_backend_always_available() {
        let configuration = Configuration {
            solver: SolverBackend::Clarabel,
            ..Configuration::default()
        };
        assert!(new_solver(&configuration).is_ok());
    }
}
