//! This module provides a struct for representing reactions
use derive_builder::Builder;
use indexmap::IndexMap;

use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::variable::{VariableBuilder, VariableHandle};

/// Represents a reaction (or lumped accounting flux) in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Reaction {
    /// Used to identify the reaction, also the id of its flux variable
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    ///
    /// Negative coefficients are consumed, positive coefficients are produced.
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None", setter(into, strip_option))]
    pub name: Option<String>,
    /// Lower flux bound
    #[builder(default = "0.")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "f64::INFINITY")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None", setter(into, strip_option))]
    pub subsystem: Option<String>,
}

impl Reaction {
    /// Stoichiometric coefficient of a metabolite, zero if the reaction doesn't involve it
    pub fn coefficient(&self, metabolite: &str) -> f64 {
        self.metabolites.get(metabolite).copied().unwrap_or(0.)
    }

    /// Whether the reaction involves no metabolite (it only appears in the objective or
    /// in bookkeeping)
    pub fn is_unbalanced(&self) -> bool {
        self.metabolites.is_empty()
    }

    /// Add the flux variable of this reaction to a problem
    pub fn declare(&self, problem: &mut Problem) -> Result<VariableHandle, ProblemError> {
        let mut builder = VariableBuilder::default();
        builder
            .id(self.id.clone())
            .lower_bound(self.lower_bound)
            .upper_bound(self.upper_bound);
        if let Some(name) = &self.name {
            builder.name(name.clone());
        }
        let variable = builder
            .build()
            .map_err(|e| ProblemError::InvalidVariable(e.to_string()))?;
        problem.add_variable(variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hexokinase() -> Reaction {
        ReactionBuilder::default()
            .id("hxk")
            .name("hexokinase")
            .metabolites(IndexMap::from([
                ("GLC".to_string(), -1.),
                ("G6P".to_string(), 1.),
                ("ATP".to_string(), -1.),
                ("ADP".to_string(), 1.),
            ]))
            .upper_bound(15.)
            .build()
            .unwrap()
    }

    #[test]
    fn build_reaction() {
        let hxk = hexokinase();
        assert!((hxk.lower_bound - 0.).abs() < 1e-25);
        assert!((hxk.upper_bound - 15.).abs() < 1e-25);
        assert!((hxk.coefficient("GLC") + 1.).abs() < 1e-25);
        assert!((hxk.coefficient("NAD") - 0.).abs() < 1e-25);
        assert!(!hxk.is_unbalanced());
        assert!(hxk.subsystem.is_none());
    }

    #[test]
    fn declare_reaction() {
        let mut problem = Problem::new();
        let handle = hexokinase().declare(&mut problem).unwrap();
        let var = problem.variable(handle).unwrap();
        assert_eq!(var.id, "hxk");
        assert_eq!(var.name.as_deref(), Some("hexokinase"));
        assert!((var.upper_bound - 15.).abs() < 1e-25);

        // Same id twice
        assert_eq!(
            hexokinase().declare(&mut problem),
            Err(ProblemError::VariableIdAlreadyExists("hxk".to_string()))
        );

        let inverted = ReactionBuilder::default()
            .id("bad")
            .lower_bound(2.)
            .upper_bound(1.)
            .build()
            .unwrap();
        assert!(matches!(
            inverted.declare(&mut problem),
            Err(ProblemError::InvalidVariableBounds { .. })
        ));
    }
}
