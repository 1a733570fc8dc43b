//! Solver interface for the microlp simplex solver
use ::microlp::{ComparisonOp, LinearExpr, OptimizationDirection};
use log::debug;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::solvers::{SolverError, StagedModel};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Dense simplex solver provided by microlp, does not report dual values
#[derive(Clone, Debug)]
pub struct MicrolpSolver {
    model: StagedModel,
}

impl MicrolpSolver {
    /// Create a new empty microlp solver
    pub fn new() -> Self {
        Self {
            model: StagedModel::new(),
        }
    }
}

impl Default for MicrolpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Solver for MicrolpSolver {
    fn add_continuous_variable(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError> {
        self.model.add_variable(id, lower_bound, upper_bound)
    }

    fn add_equality_constraint(
        &mut self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
        equals: f64,
    ) -> Result<(), SolverError> {
        self.model
            .add_constraint(id, variables, coefficients, equals, equals)
    }

    fn add_inequality_constraint(
        &mut self,
        id: &str,
        variables: Vec<&str>,
        coefficients: Vec<f64>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), SolverError> {
        self.model
            .add_constraint(id, variables, coefficients, lower_bound, upper_bound)
    }

    fn add_linear_objective_term(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), SolverError> {
        self.model.add_objective_term(variable_id, coefficient)
    }

    fn set_objective_sense(&mut self, objective_sense: ObjectiveSense) -> Result<(), SolverError> {
        self.model.sense = objective_sense;
        Ok(())
    }

    fn solve(&mut self) -> Result<ProblemSolution, SolverError> {
        let direction = match self.model.sense {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let mut problem = ::microlp::Problem::new(direction);
        let variables: Vec<::microlp::Variable> = self
            .model
            .variables
            .values()
            .zip(self.model.objective_coefficients())
            .map(|((lower, upper), coef)| problem.add_var(coef, (*lower, *upper)))
            .collect();

        let mut num_rows = 0;
        for constraint in &self.model.constraints {
            let mut rows = Vec::with_capacity(2);
            if constraint.is_equality() {
                rows.push((ComparisonOp::Eq, constraint.upper_bound));
            } else {
                if constraint.lower_bound.is_finite() {
                    rows.push((ComparisonOp::Ge, constraint.lower_bound));
                }
                if constraint.upper_bound.is_finite() {
                    rows.push((ComparisonOp::Le, constraint.upper_bound));
                }
            }
            for (op, rhs) in rows {
                let mut expr = LinearExpr::empty();
                for (index, coef) in &constraint.terms {
                    expr.add(variables[*index], *coef);
                }
                problem.add_constraint(expr, op, rhs);
                num_rows += 1;
            }
        }
        debug!(
            "microlp problem with {} variables and {} rows",
            variables.len(),
            num_rows
        );

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = variables.iter().map(|var| solution[*var]).collect();
                Ok(ProblemSolution {
                    status: OptimizationStatus::Optimal,
                    objective_value: Some(solution.objective()),
                    variable_values: Some(self.model.label_values(&values)),
                    dual_values: None,
                    problem: None,
                })
            }
            Err(::microlp::Error::Infeasible) => {
                Ok(ProblemSolution::from_status(OptimizationStatus::Infeasible))
            }
            Err(::microlp::Error::Unbounded) => {
                Ok(ProblemSolution::from_status(OptimizationStatus::Unbounded))
            }
            #[allow(unreachable_patterns)]
            Err(e) => Err(SolverError::Backend(e.to_string())),
        }
    }
}
