//! This module provides the metabolite struct representing a metabolite
use derive_builder::Builder;

/// Represents a metabolite pool held at steady state
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique), also the id of its balance constraint
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None", setter(into, strip_option))]
    pub name: Option<String>,
}

impl Metabolite {
    /// Create a metabolite from an id and a name
    pub fn new(id: &str, name: &str) -> Self {
        Metabolite {
            id: id.to_string(),
            name: Some(name.to_string()),
        }
    }
}
