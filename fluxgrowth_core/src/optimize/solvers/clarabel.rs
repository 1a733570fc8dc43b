//! Implements a solver interface for Clarabel
//!
//! Clarabel solves conic problems of the form
//!
//! ```text
//! minimize    1/2 x'Px + q'x
//! subject to  Ax + s = b,  s in K
//! ```
//!
//! A linear program maps onto this with `P = 0`, a zero cone holding the equality rows
//! and a nonnegative cone holding every `a'x <= b` row. Variable bounds become rows of
//! the nonnegative cone as well (or of the zero cone when a variable is fixed).
use ::clarabel::algebra::CscMatrix;
use ::clarabel::solver::*;
use indexmap::IndexMap;
use log::debug;
use nalgebra_sparse::CooMatrix;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::solvers::{SolverError, StagedModel};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Clarabel interior point solver
#[derive(Clone, Debug)]
pub struct ClarabelSolver {
    model: StagedModel,
    verbose: bool,
}

/// One row of `Ax + s = b`
struct Row {
    terms: Vec<(usize, f64)>,
    rhs: f64,
    /// Index of the originating constraint and the sign the row was written with
    origin: Option<(usize, f64)>,
}

impl ClarabelSolver {
    /// Create a new empty Clarabel solver
    pub fn new(verbose: bool) -> Self {
        Self {
            model: StagedModel::new(),
            verbose,
        }
    }

    /// Split the staged problem into equality rows and `<=` rows
    fn assemble_rows(&self) -> (Vec<Row>, Vec<Row>) {
        let mut equalities = Vec::new();
        let mut inequalities = Vec::new();
        for (index, (lower, upper)) in self.model.variables.values().enumerate() {
            if lower == upper {
                equalities.push(Row {
                    terms: vec![(index, 1.)],
                    rhs: *upper,
                    origin: None,
                });
                continue;
            }
            if upper.is_finite() {
                inequalities.push(Row {
                    terms: vec![(index, 1.)],
                    rhs: *upper,
                    origin: None,
                });
            }
            if lower.is_finite() {
                inequalities.push(Row {
                    terms: vec![(index, -1.)],
                    rhs: -*lower,
                    origin: None,
                });
            }
        }
        for (index, constraint) in self.model.constraints.iter().enumerate() {
            if constraint.is_equality() {
                equalities.push(Row {
                    terms: constraint.terms.clone(),
                    rhs: constraint.upper_bound,
                    origin: Some((index, 1.)),
                });
                continue;
            }
            if constraint.upper_bound.is_finite() {
                inequalities.push(Row {
                    terms: constraint.terms.clone(),
                    rhs: constraint.upper_bound,
                    origin: Some((index, 1.)),
                });
            }
            if constraint.lower_bound.is_finite() {
                inequalities.push(Row {
                    terms: constraint.terms.iter().map(|(j, a)| (*j, -a)).collect(),
                    rhs: -constraint.lower_bound,
                    origin: Some((index, -1.)),
                });
            }
        }
        (equalities, inequalities)
    }

    /// Build the sparse constraint matrix in compressed column form
    fn constraint_matrix(rows: &[&Row], num_variables: usize) -> CscMatrix<f64> {
        let mut coo = CooMatrix::new(rows.len(), num_variables);
        for (i, row) in rows.iter().enumerate() {
            for (j, a) in &row.terms {
                coo.push(i, *j, *a);
            }
        }
        let (col_offsets, row_indices, values) =
            nalgebra_sparse::CscMatrix::from(&coo).disassemble();
        CscMatrix::new(rows.len(), num_variables, col_offsets, row_indices, values)
    }

    /// Sum the row duals back onto the constraints they came from
    fn constraint_duals(&self, rows: &[&Row], z: &[f64]) -> IndexMap<String, f64> {
        let mut duals: IndexMap<String, f64> = self
            .model
            .constraints
            .iter()
            .map(|c| (c.id.clone(), 0.))
            .collect();
        for (row, dual) in rows.iter().zip(z) {
            if let Some((index, sign)) = row.origin {
                if let Some((_, value)) = duals.get_index_mut(index) {
                    *value += sign * dual;
                }
            }
        }
        duals
    }
}

impl super::Solver for ClarabelSolver {
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
        let num_variables = self.model.variables.len();
        let (equalities, inequalities) = self.assemble_rows();
        let rows: Vec<&Row> = equalities.iter().chain(inequalities.iter()).collect();
        debug!(
            "Clarabel problem with {} variables, {} equality rows and {} inequality rows",
            num_variables,
            equalities.len(),
            inequalities.len()
        );

        // Clarabel always minimizes
        let sign = match self.model.sense {
            ObjectiveSense::Minimize => 1.,
            ObjectiveSense::Maximize => -1.,
        };
        let q: Vec<f64> = self
            .model
            .objective_coefficients()
            .into_iter()
            .map(|c| sign * c)
            .collect();
        let p = CscMatrix::new(
            num_variables,
            num_variables,
            vec![0; num_variables + 1],
            Vec::new(),
            Vec::new(),
        );
        let a = Self::constraint_matrix(&rows, num_variables);
        let b: Vec<f64> = rows.iter().map(|row| row.rhs).collect();
        let mut cones: Vec<SupportedConeT<f64>> = Vec::new();
        if !equalities.is_empty() {
            cones.push(SupportedConeT::ZeroConeT(equalities.len()));
        }
        if !inequalities.is_empty() {
            cones.push(SupportedConeT::NonnegativeConeT(inequalities.len()));
        }
        let settings: DefaultSettings<f64> = DefaultSettingsBuilder::default()
            .verbose(self.verbose)
            .build()
            .map_err(|e| SolverError::Backend(e.to_string()))?;

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        solver.solve();

        let status = match solver.solution.status {
            SolverStatus::Solved => OptimizationStatus::Optimal,
            SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                OptimizationStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                OptimizationStatus::Unbounded
            }
            SolverStatus::MaxIterations
            | SolverStatus::MaxTime
            | SolverStatus::InsufficientProgress => OptimizationStatus::SolverHalted,
            _ => OptimizationStatus::NumericalError,
        };
        if !status.is_optimal() {
            return Ok(ProblemSolution::from_status(status));
        }
        Ok(ProblemSolution {
            status,
            objective_value: Some(sign * solver.solution.obj_val),
            variable_values: Some(self.model.label_values(&solver.solution.x)),
            dual_values: Some(self.constraint_duals(&rows, &solver.solution.z)),
            problem: None,
        })
    }
}
