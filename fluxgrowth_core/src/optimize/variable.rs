//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use derive_builder::Builder;

/// A continuous variable of an optimization problem, in this crate always a flux
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Variable {
    /// Used to identify the variable (must be unique within a problem)
    pub id: String,
    /// Human-readable name of the variable
    #[builder(default = "None", setter(into, strip_option))]
    pub name: Option<String>,
    /// Lowest value the variable can take
    #[builder(default = "0.")]
    pub lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "f64::INFINITY")]
    pub upper_bound: f64,
    /// Position of the variable in the problem
    #[builder(default = "0", setter(skip))]
    pub(crate) index: usize,
}

impl Variable {
    /// Whether the bounds pin the variable to a single value
    pub fn is_fixed(&self) -> bool {
        self.lower_bound == self.upper_bound
    }

    /// Whether the variable has neither a finite lower nor a finite upper bound
    pub fn is_free(&self) -> bool {
        self.lower_bound == f64::NEG_INFINITY && self.upper_bound == f64::INFINITY
    }

    /// Position of the variable in the problem it belongs to
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:[{}, {}]", name, self.lower_bound, self.upper_bound),
            None => write!(f, "{}:[{}, {}]", self.id, self.lower_bound, self.upper_bound),
        }
    }
}

/// Identifies the problem a [`VariableHandle`] was issued by.
///
/// Clones of a problem keep its id, so handles stay valid on the clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProblemId(u64);

impl ProblemId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        ProblemId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Cheap reference to a variable of a particular problem
///
/// Handles are returned when declaring variables, and are used to build
/// [`LinearExpression`](crate::optimize::expression::LinearExpression)s with the usual
/// arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableHandle {
    pub(crate) problem: ProblemId,
    pub(crate) index: usize,
}

impl VariableHandle {
    /// Position of the referenced variable in its problem
    pub fn index(&self) -> usize {
        self.index
    }
}
