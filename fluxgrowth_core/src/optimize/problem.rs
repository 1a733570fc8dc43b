//! Provides struct representing an optimization problem
use indexmap::IndexMap;
use log::{debug, info, warn};
use thiserror::Error;

use crate::configuration::Configuration;
use crate::optimize::constraint::{Constraint, Relation};
use crate::optimize::expression::LinearExpression;
use crate::optimize::objective::{Objective, ObjectiveSense};
use crate::optimize::solvers::{new_solver, SolverError};
use crate::optimize::variable::{ProblemId, Variable, VariableBuilder, VariableHandle};
use crate::optimize::{OptimizationStatus, ProblemSolution, SolutionError};

/// A linear optimization problem
///
/// A problem is either unsolved or solved. [`Problem::solve`] is the only transition to
/// solved, and any change to the variables, constraints or objective returns the
/// problem to unsolved, dropping the stored solution.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Identifies the handles issued by this problem (shared with clones)
    id: ProblemId,
    /// Name written in the LP format header
    name: Option<String>,
    /// Default bounds, tolerance and solver
    configuration: Configuration,
    /// Objective to optimize, at most one
    objective: Option<Objective>,
    /// Variables of the optimization problem
    variables: IndexMap<String, Variable>,
    /// Constraints of the optimization problem
    constraints: IndexMap<String, Constraint>,
    /// Current status of the optimization problem
    status: OptimizationStatus,
    /// Solution of the last solve, None while unsolved
    solution: Option<ProblemSolution>,
}

impl Default for Problem {
    fn default() -> Self {
        Self::new()
    }
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem with the default configuration
    pub fn new() -> Self {
        Self::with_configuration(Configuration::default())
    }

    /// Create a new optimization problem with the given configuration
    pub fn with_configuration(configuration: Configuration) -> Self {
        Self {
            id: ProblemId::next(),
            name: None,
            configuration,
            objective: None,
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            status: OptimizationStatus::Unoptimized,
            solution: None,
        }
    }

    /// Set the name of the problem
    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }
    // endregion Creation Functions

    // region Accessors
    /// Name of the problem, if one was set
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Configuration the problem was created with
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Current status of the problem
    pub fn status(&self) -> OptimizationStatus {
        self.status
    }

    /// Solution of the last solve, None while the problem is unsolved
    pub fn solution(&self) -> Option<&ProblemSolution> {
        self.solution.as_ref()
    }

    /// The objective, if one was set
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Iterate over the variables in declaration order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Iterate over the constraints in declaration order
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    /// Get a constraint by id
    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    /// Number of variables in the problem
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints in the problem
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Get the variable a handle refers to
    pub fn variable(&self, handle: VariableHandle) -> Result<&Variable, ProblemError> {
        self.validate_handle(handle)?;
        Ok(&self.variables[handle.index])
    }

    /// Look up the handle of a variable by id
    pub fn handle(&self, id: &str) -> Option<VariableHandle> {
        self.variables
            .get_index_of(id)
            .map(|index| VariableHandle {
                problem: self.id,
                index,
            })
    }
    // endregion Accessors

    // region Adding Variables
    /// Add a variable to the optimization problem
    pub fn add_variable(&mut self, mut variable: Variable) -> Result<VariableHandle, ProblemError> {
        // Validate that the variable can in fact be added to the problem
        self.validate_variable(&variable)?;
        // Update the index of the variable to reflect the current variable count
        variable.index = self.variables.len();
        debug!(
            "Adding variable {} with bounds [{}, {}]",
            variable.id, variable.lower_bound, variable.upper_bound
        );
        let handle = VariableHandle {
            problem: self.id,
            index: variable.index,
        };
        self.variables.insert(variable.id.clone(), variable);
        self.invalidate();
        Ok(handle)
    }

    /// Create a new variable with explicit bounds and add it to the optimization problem
    ///
    /// Fails with [`ProblemError::InvalidVariableBounds`] if `lower_bound > upper_bound`
    /// or either bound is NaN.
    pub fn declare_variable(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<VariableHandle, ProblemError> {
        let variable = VariableBuilder::default()
            .id(id)
            .lower_bound(lower_bound)
            .upper_bound(upper_bound)
            .build()
            .map_err(|e| ProblemError::InvalidVariable(e.to_string()))?;
        self.add_variable(variable)
    }

    /// Create a new variable with the configured default bounds, `[0, inf)` unless
    /// configured otherwise
    pub fn declare_flux(&mut self, id: &str) -> Result<VariableHandle, ProblemError> {
        self.declare_variable(
            id,
            self.configuration.lower_bound,
            self.configuration.upper_bound,
        )
    }

    /// Create a new variable with a lower bound and the configured default upper bound
    pub fn declare_bounded_below(
        &mut self,
        id: &str,
        lower_bound: f64,
    ) -> Result<VariableHandle, ProblemError> {
        self.declare_variable(id, lower_bound, self.configuration.upper_bound)
    }

    /// Create a new variable without bounds
    pub fn declare_free(&mut self, id: &str) -> Result<VariableHandle, ProblemError> {
        self.declare_variable(id, f64::NEG_INFINITY, f64::INFINITY)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem
    pub fn add_new_constraint(&mut self, constraint: Constraint) -> Result<(), ProblemError> {
        self.validate_constraint(&constraint)?;
        debug!("Adding constraint {}", constraint.get_id());
        self.constraints
            .insert(constraint.get_id().to_string(), constraint);
        self.invalidate();
        Ok(())
    }

    /// Create a constraint `expression relation rhs` and add it to the problem
    pub fn add_constraint(
        &mut self,
        id: &str,
        expression: LinearExpression,
        relation: Relation,
        rhs: f64,
    ) -> Result<(), ProblemError> {
        self.add_new_constraint(Constraint::from_expression(id, expression, relation, rhs))
    }

    /// Create a constraint `lower_bound <= expression <= upper_bound` and add it to the problem
    pub fn add_range_constraint(
        &mut self,
        id: &str,
        expression: LinearExpression,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        self.add_new_constraint(Constraint::new_range(id, expression, lower_bound, upper_bound))
    }
    // endregion Adding Constraints

    // region Objective
    /// Set the objective of the problem
    ///
    /// A problem has a single objective, setting it a second time fails with
    /// [`ProblemError::ObjectiveAlreadySet`]. Call [`Problem::clear_objective`] first to
    /// replace it.
    pub fn set_objective(
        &mut self,
        expression: LinearExpression,
        sense: ObjectiveSense,
    ) -> Result<(), ProblemError> {
        if self.objective.is_some() {
            return Err(ProblemError::ObjectiveAlreadySet);
        }
        let objective = Objective::new(expression, sense);
        if objective.get_variables().any(|var| !self.is_valid_handle(var)) {
            return Err(ProblemError::NonExistentVariablesInObjective);
        }
        self.objective = Some(objective);
        self.invalidate();
        Ok(())
    }

    /// Set an objective to maximize
    pub fn maximize(&mut self, expression: LinearExpression) -> Result<(), ProblemError> {
        self.set_objective(expression, ObjectiveSense::Maximize)
    }

    /// Set an objective to minimize
    pub fn minimize(&mut self, expression: LinearExpression) -> Result<(), ProblemError> {
        self.set_objective(expression, ObjectiveSense::Minimize)
    }

    /// Update the objective sense of the problem
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) -> Result<(), ProblemError> {
        match self.objective.as_mut() {
            Some(objective) => objective.set_sense(sense),
            None => return Err(ProblemError::MissingObjective),
        }
        self.invalidate();
        Ok(())
    }

    /// Remove the objective, returning it if there was one
    pub fn clear_objective(&mut self) -> Option<Objective> {
        self.invalidate();
        self.objective.take()
    }
    // endregion Objective

    // region update variable bounds
    /// Update the bounds of a variable
    pub fn update_variable_bounds(
        &mut self,
        handle: VariableHandle,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        self.validate_handle(handle)?;
        Self::validate_bounds(&self.variables[handle.index].id, lower_bound, upper_bound)?;
        let var = &mut self.variables[handle.index];
        var.lower_bound = lower_bound;
        var.upper_bound = upper_bound;
        self.invalidate();
        Ok(())
    }

    /// Update the bounds of a variable, by id
    pub fn update_variable_bounds_by_id(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let handle = self.handle(id).ok_or(ProblemError::NonExistentVariable)?;
        self.update_variable_bounds(handle, lower_bound, upper_bound)
    }
    // endregion update variable bounds

    // region Remove Constraints
    /// Remove a constraint (by id) from the problem
    pub fn remove_constraint(&mut self, constraint_id: &str) -> Option<Constraint> {
        let removed = self.constraints.shift_remove(constraint_id);
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }
    // endregion Remove Constraints

    // region Solve
    /// Solve the problem with the configured backend
    ///
    /// Infeasible and unbounded problems are not errors, they are reported by the
    /// status of the returned solution. Check the status before reading values.
    pub fn solve(&mut self) -> Result<ProblemSolution, ProblemError> {
        let objective = self
            .objective
            .as_ref()
            .ok_or(ProblemError::MissingObjective)?;
        let mut solver = new_solver(&self.configuration)?;
        info!(
            "Solving problem with {} variables and {} constraints using {:?}",
            self.variables.len(),
            self.constraints.len(),
            self.configuration.solver
        );
        for var in self.variables.values() {
            solver.add_continuous_variable(&var.id, var.lower_bound, var.upper_bound)?;
        }
        for constraint in self.constraints.values() {
            let (ids, coefficients): (Vec<&str>, Vec<f64>) = constraint
                .get_terms()
                .iter()
                .map(|t| (self.variables[t.variable.index].id.as_str(), t.coefficient))
                .unzip();
            match constraint {
                Constraint::Equality { id, equals, .. } => {
                    solver.add_equality_constraint(id, ids, coefficients, *equals)?
                }
                Constraint::Inequality {
                    id,
                    lower_bound,
                    upper_bound,
                    ..
                } => solver.add_inequality_constraint(
                    id,
                    ids,
                    coefficients,
                    *lower_bound,
                    *upper_bound,
                )?,
            }
        }
        for term in objective.terms() {
            solver.add_linear_objective_term(&self.variables[term.var.index].id, term.coef)?;
        }
        solver.set_objective_sense(objective.sense())?;
        let objective_constant = objective.constant();

        let mut solution = solver.solve()?;
        solution.problem = Some(self.id);
        if let Some(value) = solution.objective_value.as_mut() {
            *value += objective_constant;
        }

        if solution.has_values() {
            info!(
                "Optimization finished with status {}, objective value {:?}",
                solution.status, solution.objective_value
            );
            for (id, violation) in
                self.constraint_violations(&solution, self.configuration.tolerance)
            {
                warn!("Constraint {} violated by {:e} at the optimum", id, violation);
            }
        } else {
            warn!("Optimization finished with status {}", solution.status);
        }
        self.status = solution.status;
        self.solution = Some(solution.clone());
        Ok(solution)
    }

    /// Value of a variable in the stored solution
    pub fn value(&self, handle: VariableHandle) -> Result<f64, SolutionError> {
        self.stored_solution()?.value(handle)
    }

    /// Evaluate an expression with the stored solution
    pub fn evaluate(&self, expression: &LinearExpression) -> Result<f64, SolutionError> {
        self.stored_solution()?.evaluate(expression)
    }

    /// Constraints not satisfied by `solution` within `tolerance`, as (id, violation) pairs
    pub fn constraint_violations(
        &self,
        solution: &ProblemSolution,
        tolerance: f64,
    ) -> Vec<(String, f64)> {
        let values: Vec<f64> = match &solution.variable_values {
            Some(values) if values.len() == self.variables.len() => {
                values.values().copied().collect()
            }
            _ => return Vec::new(),
        };
        self.constraints
            .values()
            .filter_map(|constraint| {
                let violation = constraint.violation(constraint.activity(&values));
                (violation > tolerance).then(|| (constraint.get_id().to_string(), violation))
            })
            .collect()
    }

    fn stored_solution(&self) -> Result<&ProblemSolution, SolutionError> {
        self.solution.as_ref().ok_or(SolutionError::NoSolution {
            status: self.status,
        })
    }

    /// Return to the unsolved state
    fn invalidate(&mut self) {
        self.status = OptimizationStatus::Unoptimized;
        self.solution = None;
    }
    // endregion Solve

    // region Validation Functions
    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: &Variable) -> Result<(), ProblemError> {
        // Check if there is already a variable with this id
        if self.variables.contains_key(&variable.id) {
            return Err(ProblemError::VariableIdAlreadyExists(variable.id.clone()));
        }
        Self::validate_bounds(&variable.id, variable.lower_bound, variable.upper_bound)
    }

    fn validate_bounds(id: &str, lower_bound: f64, upper_bound: f64) -> Result<(), ProblemError> {
        if !Self::bounds_are_satisfiable(lower_bound, upper_bound) {
            return Err(ProblemError::InvalidVariableBounds {
                id: id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        Ok(())
    }

    /// Check that a constraint to be added is valid to add to this Problem
    fn validate_constraint(&self, constraint: &Constraint) -> Result<(), ProblemError> {
        // Check that a constraint with the same id doesn't already exist
        if self.constraints.contains_key(constraint.get_id()) {
            return Err(ProblemError::ConstraintAlreadyExists(
                constraint.get_id().to_string(),
            ));
        }
        // Check that the bounds make sense, an equality needs a finite right hand side
        let (lower_bound, upper_bound) = constraint.bounds();
        if !Self::bounds_are_satisfiable(lower_bound, upper_bound) {
            return Err(ProblemError::InvalidConstraintBounds(
                constraint.get_id().to_string(),
            ));
        }
        // Check that the variables in this constraint are in the problem
        if constraint.get_variables().any(|var| !self.is_valid_handle(var)) {
            return Err(ProblemError::NonExistentVariablesInConstraint(
                constraint.get_id().to_string(),
            ));
        }
        Ok(())
    }

    /// An interval `[lower, upper]` that contains at least one finite value
    fn bounds_are_satisfiable(lower_bound: f64, upper_bound: f64) -> bool {
        !lower_bound.is_nan()
            && !upper_bound.is_nan()
            && lower_bound <= upper_bound
            && lower_bound < f64::INFINITY
            && upper_bound > f64::NEG_INFINITY
    }

    fn validate_handle(&self, handle: VariableHandle) -> Result<(), ProblemError> {
        if self.is_valid_handle(handle) {
            Ok(())
        } else {
            Err(ProblemError::NonExistentVariable)
        }
    }

    fn is_valid_handle(&self, handle: VariableHandle) -> bool {
        handle.problem == self.id && handle.index < self.variables.len()
    }
    // endregion Validation Functions
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add variable {0} with the same id as an existing variable")]
    VariableIdAlreadyExists(String),
    /// Error when a variable could not be built
    #[error("Invalid variable: {0}")]
    InvalidVariable(String),
    /// Error when trying to add variable with invalid bounds
    #[error("Tried to give variable {id} bounds [{lower_bound}, {upper_bound}], lower_bound>upper_bound")]
    InvalidVariableBounds {
        /// Id of the variable
        id: String,
        /// Rejected lower bound
        lower_bound: f64,
        /// Rejected upper bound
        upper_bound: f64,
    },
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add constraint {0} with the same id as an existing constraint")]
    ConstraintAlreadyExists(String),
    /// Error when trying to add a constraint with invalid bounds
    #[error("Tried to add inequality constraint {0} with lower_bound > upper_bound")]
    InvalidConstraintBounds(String),
    /// Error when trying to add a constraint that contains variables not in the model
    #[error("Tried to add constraint {0} with variables not in the problem")]
    NonExistentVariablesInConstraint(String),
    /// Error when trying to add an objective which includes variables not in the model
    #[error("Tried setting an objective with variables not in the problem")]
    NonExistentVariablesInObjective,
    /// Error when trying to perform an update on a variable that doesn't exist
    #[error("Tried to access a variable that doesn't exist")]
    NonExistentVariable,
    /// Error when setting an objective on a problem that already has one
    #[error("The problem already has an objective, clear it before setting a new one")]
    ObjectiveAlreadySet,
    /// Error when solving or changing the sense of a problem without an objective
    #[error("The problem has no objective")]
    MissingObjective,
    /// Error raised by the solver backend
    #[error(transparent)]
    Solver(#[from] SolverError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{ConfigurationBuilder, SolverBackend};
    use approx::assert_abs_diff_eq;

    /// maximize 3x + 2y s.t. x + y <= 4, x + 3y <= 6, 0 <= x <= 3, y >= 0
    fn small_problem(configuration: Configuration) -> (Problem, VariableHandle, VariableHandle) {
        let mut problem = Problem::with_configuration(configuration);
        let x = problem.declare_variable("x", 0., 3.).unwrap();
        let y = problem.declare_flux("y").unwrap();
        problem
            .add_constraint("c1", x + y, Relation::LessOrEqual, 4.)
            .unwrap();
        problem
            .add_constraint("c2", x + 3. * y, Relation::LessOrEqual, 6.)
            .unwrap();
        problem.maximize(3. * x + 2. * y).unwrap();
        (problem, x, y)
    }

    #[test]
    fn new_problem() {
        let problem = Problem::new();
        assert_eq!(problem.status(), OptimizationStatus::Unoptimized);
        assert_eq!(problem.num_variables(), 0);
        assert!(problem.objective().is_none());
    }

    #[test]
    fn update_objective_sense() {
        let mut problem = Problem::new();
        let x = problem.declare_variable("x", 0., 1.).unwrap();
        assert_eq!(
            problem.update_objective_sense(ObjectiveSense::Minimize),
            Err(ProblemError::MissingObjective)
        );
        problem.maximize(x.into()).unwrap();
        problem
            .update_objective_sense(ObjectiveSense::Minimize)
            .unwrap();
        assert_eq!(
            problem.objective().unwrap().sense(),
            ObjectiveSense::Minimize
        );
    }

    #[test]
    fn add_variables() {
        let mut problem = Problem::new();

        // Add a single variable
        let x = problem.declare_variable("x", 64., 100.).unwrap();
        let var = problem.variable(x).unwrap();
        assert_eq!(var.index(), 0);
        assert!(
            (var.lower_bound - 64.0).abs() < 1e-25,
            "Variable added with incorrect lower bound"
        );
        assert!(
            (var.upper_bound - 100.0).abs() < 1e-25,
            "Variable added with incorrect upper bound"
        );

        // Defaults come from the configuration
        let y = problem.declare_flux("y").unwrap();
        let var = problem.variable(y).unwrap();
        assert_eq!(var.index(), 1);
        assert!((var.lower_bound - 0.).abs() < 1e-25);
        assert!(var.upper_bound.is_infinite());

        let t = problem.declare_free("t").unwrap();
        assert!(problem.variable(t).unwrap().is_free());
        assert_eq!(problem.handle("t"), Some(t));
    }

    #[test]
    fn add_bad_variable() {
        let mut problem = Problem::new();

        // Add a variable with bad bounds
        let res = problem.declare_variable("x", 100., 64.);
        if let Err(ProblemError::InvalidVariableBounds { id, .. }) = res {
            assert_eq!(id, "x");
        } else {
            panic!("Invalid variable bounds not caught")
        }
        assert!(matches!(
            problem.declare_variable("nan", f64::NAN, 1.),
            Err(ProblemError::InvalidVariableBounds { .. })
        ));

        // Duplicate ids are rejected
        problem.declare_flux("x").unwrap();
        assert_eq!(
            problem.declare_flux("x"),
            Err(ProblemError::VariableIdAlreadyExists("x".to_string()))
        );
    }

    #[test]
    fn add_constraint() {
        let mut problem = Problem::new();

        // Add some variables
        let x = problem.declare_variable("x", 64., 100.).unwrap();
        let y = problem.declare_variable("y", 64., 100.).unwrap();

        // Add an equality constraint
        problem
            .add_constraint("test_constraint", 2. * x + 3. * y, Relation::Equal, 200.)
            .unwrap();

        // Check that the constraint was correctly added
        match problem.constraint("test_constraint").unwrap() {
            Constraint::Equality { equals, .. } => {
                assert!((equals - 200.).abs() < 1e-25)
            }
            Constraint::Inequality { .. } => panic!("Incorrect constraint type added"),
        }

        // Add an inequality constraint
        problem
            .add_range_constraint("test_range", 2. * x + 3. * y, 100., 200.)
            .unwrap();

        // Check that the constraint was correctly added
        match problem.constraint("test_range").unwrap() {
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => {
                assert!((lower_bound - 100.).abs() < 1e-25);
                assert!((upper_bound - 200.).abs() < 1e-25);
            }
            Constraint::Equality { .. } => panic!("Incorrect constraint type added"),
        }
        assert_eq!(problem.num_constraints(), 2);
    }

    #[test]
    fn add_bad_constraint() {
        let mut problem = Problem::new();

        // Add some variables
        let x = problem.declare_variable("x", 64., 100.).unwrap();
        let y = problem.declare_variable("y", 64., 100.).unwrap();

        // Inverted bounds
        assert_eq!(
            problem.add_range_constraint("bad_constraint", 2. * x + 3. * y, 200., 100.),
            Err(ProblemError::InvalidConstraintBounds(
                "bad_constraint".to_string()
            ))
        );

        // Duplicate id
        problem
            .add_constraint("c", x - y, Relation::Equal, 0.)
            .unwrap();
        assert_eq!(
            problem.add_constraint("c", x + y, Relation::Equal, 0.),
            Err(ProblemError::ConstraintAlreadyExists("c".to_string()))
        );

        // Variables from another problem
        let mut other = Problem::new();
        let z = other.declare_flux("z").unwrap();
        assert_eq!(
            problem.add_constraint("foreign", x + z, Relation::LessOrEqual, 1.),
            Err(ProblemError::NonExistentVariablesInConstraint(
                "foreign".to_string()
            ))
        );
        assert_eq!(
            problem.maximize(z.into()),
            Err(ProblemError::NonExistentVariablesInObjective)
        );
    }

    #[test]
    fn infinite_bounds_are_rejected() {
        let mut problem = Problem::new();
        let x = problem.declare_variable("x", 0., 10.).unwrap();

        // No finite value lies in [inf, inf] or [-inf, -inf]
        assert!(matches!(
            problem.declare_variable("y", f64::INFINITY, f64::INFINITY),
            Err(ProblemError::InvalidVariableBounds { .. })
        ));
        assert!(matches!(
            problem.declare_variable("z", f64::NEG_INFINITY, f64::NEG_INFINITY),
            Err(ProblemError::InvalidVariableBounds { .. })
        ));
        assert!(matches!(
            problem.update_variable_bounds(x, f64::INFINITY, f64::INFINITY),
            Err(ProblemError::InvalidVariableBounds { .. })
        ));
        let var = problem.variable(x).unwrap();
        assert!((var.upper_bound - 10.).abs() < 1e-25);

        assert_eq!(
            problem.add_constraint("eq", x.into(), Relation::Equal, f64::INFINITY),
            Err(ProblemError::InvalidConstraintBounds("eq".to_string()))
        );
        assert_eq!(
            problem.add_constraint("ge", x.into(), Relation::GreaterOrEqual, f64::INFINITY),
            Err(ProblemError::InvalidConstraintBounds("ge".to_string()))
        );
        assert_eq!(
            problem.add_constraint("le", x.into(), Relation::LessOrEqual, f64::NEG_INFINITY),
            Err(ProblemError::InvalidConstraintBounds("le".to_string()))
        );
        assert_eq!(problem.num_constraints(), 0);

        // One sided infinite bounds are still fine
        problem.declare_free("t").unwrap();
        problem
            .add_constraint("open", x.into(), Relation::GreaterOrEqual, f64::NEG_INFINITY)
            .unwrap();
    }

    #[test]
    fn objective_is_set_once() {
        let mut problem = Problem::new();
        let x = problem.declare_variable("x", 0., 1.).unwrap();
        let y = problem.declare_variable("y", 0., 1.).unwrap();
        problem.maximize(x.into()).unwrap();
        assert_eq!(
            problem.maximize(y.into()),
            Err(ProblemError::ObjectiveAlreadySet)
        );
        let previous = problem.clear_objective().unwrap();
        assert_eq!(previous.terms()[0].var, x);
        problem.maximize(y.into()).unwrap();
    }

    #[test]
    fn solve_without_objective() {
        let mut problem = Problem::new();
        problem.declare_flux("x").unwrap();
        assert_eq!(problem.solve(), Err(ProblemError::MissingObjective));
    }

    #[test]
    fn solve_small_problem() {
        let (mut problem, x, y) = small_problem(Configuration::default());
        assert_eq!(
            problem.value(x),
            Err(SolutionError::NoSolution {
                status: OptimizationStatus::Unoptimized
            })
        );
        let solution = problem.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert_eq!(problem.status(), OptimizationStatus::Optimal);
        assert_abs_diff_eq!(solution.objective_value.unwrap(), 11., epsilon = 1e-6);
        assert_abs_diff_eq!(problem.value(x).unwrap(), 3., epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value(y).unwrap(), 1., epsilon = 1e-6);
        assert!(problem.constraint_violations(&solution, 1e-6).is_empty());
    }

    #[test]
    fn solve_with_clarabel() {
        let configuration = ConfigurationBuilder::default()
            .solver(SolverBackend::Clarabel)
            .build()
            .unwrap();
        let (mut problem, x, y) = small_problem(configuration);
        let solution = problem.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert_abs_diff_eq!(solution.objective_value.unwrap(), 11., epsilon = 1e-5);
        assert_abs_diff_eq!(solution.evaluate(&(x + y)).unwrap(), 4., epsilon = 1e-5);
    }

    #[test]
    fn objective_constant_is_reported() {
        let mut problem = Problem::new();
        let x = problem.declare_variable("x", 0., 2.).unwrap();
        problem.maximize(x + 10.).unwrap();
        let solution = problem.solve().unwrap();
        assert_abs_diff_eq!(solution.objective_value.unwrap(), 12., epsilon = 1e-6);
    }

    #[test]
    fn infeasible_is_a_status() {
        let (mut problem, x, _) = small_problem(Configuration::default());
        problem
            .add_constraint("too_much", x.into(), Relation::GreaterOrEqual, 5.)
            .unwrap();
        let solution = problem.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Infeasible);
        assert_eq!(
            problem.value(x),
            Err(SolutionError::NoSolution {
                status: OptimizationStatus::Infeasible
            })
        );
    }

    #[test]
    fn changes_invalidate_solution() {
        let (mut problem, x, _) = small_problem(Configuration::default());
        problem.solve().unwrap();
        assert!(problem.solution().is_some());
        problem.update_variable_bounds(x, 0., 2.).unwrap();
        assert_eq!(problem.status(), OptimizationStatus::Unoptimized);
        assert!(problem.solution().is_none());
        assert!(problem.value(x).is_err());
    }

    #[test]
    fn bound_changes_are_monotone() {
        let (mut problem, x, _) = small_problem(Configuration::default());
        let baseline = problem.solve().unwrap().objective_value.unwrap();
        // Resolving an unchanged problem gives the same value
        let again = problem.solve().unwrap().objective_value.unwrap();
        assert_eq!(baseline, again);

        problem.update_variable_bounds_by_id("x", 0., 2.).unwrap();
        let tightened = problem.solve().unwrap().objective_value.unwrap();
        assert!(tightened <= baseline + 1e-9);

        problem.update_variable_bounds(x, 0., 4.).unwrap();
        let loosened = problem.solve().unwrap().objective_value.unwrap();
        assert!(loosened >= baseline - 1e-9);

        assert_eq!(
            problem.update_variable_bounds(x, 5., 4.),
            Err(ProblemError::InvalidVariableBounds {
                id: "x".to_string(),
                lower_bound: 5.,
                upper_bound: 4.
            })
        );
    }

    #[test]
    fn clones_share_handles_but_not_state() {
        let (mut problem, x, _) = small_problem(Configuration::default());
        let mut restricted = problem.clone();
        restricted.update_variable_bounds(x, 0., 1.).unwrap();
        let base = problem.solve().unwrap();
        let tight = restricted.solve().unwrap();
        assert_abs_diff_eq!(base.value(x).unwrap(), 3., epsilon = 1e-6);
        assert_abs_diff_eq!(tight.value(x).unwrap(), 1., epsilon = 1e-6);
    }

    #[test]
    fn remove_constraint() {
        let (mut problem, _, _) = small_problem(Configuration::default());
        assert!(problem.remove_constraint("c1").is_some());
        assert!(problem.remove_constraint("c1").is_none());
        assert_eq!(problem.num_constraints(), 1);
    }
}
