//! Core rust implementation of fluxgrowth, a flux balance model of yeast central carbon
//! metabolism that maximizes growth associated ATP production.
//!
//! - [`optimize`] provides a small linear programming layer (variables, linear
//!   expressions, constraints and objective) on top of the solver crates.
//! - [`metabolic_model`] builds the growth network on top of it and derives the growth
//!   report from an optimal solution.
//! - [`configuration`] holds the per problem settings.

pub mod configuration;
pub mod metabolic_model;
pub mod optimize;
