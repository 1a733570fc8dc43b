//! Configuration of an optimization problem
//!
//! Every [`Problem`](crate::optimize::problem::Problem) owns its own `Configuration`,
//! there is no process wide configuration state.
use derive_builder::Builder;

/// Settings shared by all the variables and the solve of one problem
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Lower bound given to variables declared without an explicit lower bound
    #[builder(default = "0.")]
    pub lower_bound: f64,
    /// Upper bound given to variables declared without an explicit upper bound
    #[builder(default = "f64::INFINITY")]
    pub upper_bound: f64,
    /// Absolute tolerance used when checking constraints at the optimum
    #[builder(default = "1e-07")]
    pub tolerance: f64,
    /// Backend used to solve the problem
    #[builder(default)]
    pub solver: SolverBackend,
    /// Whether the backend should print its own progress output
    #[builder(default = "false")]
    pub verbose: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: 0.,
            upper_bound: f64::INFINITY,
            tolerance: 1e-07,
            solver: SolverBackend::default(),
            verbose: false,
        }
    }
}

/// Enum used to specify the solver to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    /// Use the Clarabel interior point solver
    Clarabel,
    /// Use the microlp simplex solver, requires the microlp feature to be enabled
    Microlp,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "microlp")] {
        const DEFAULT_BACKEND: SolverBackend = SolverBackend::Microlp;
    } else {
        const DEFAULT_BACKEND: SolverBackend = SolverBackend::Clarabel;
    }
}

impl Default for SolverBackend {
    fn default() -> Self {
        DEFAULT_BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_default() {
        let built = ConfigurationBuilder::default().build().unwrap();
        assert_eq!(built, Configuration::default());
        assert_eq!(built.lower_bound, 0.);
        assert!(built.upper_bound.is_infinite());
    }

    #[test]
    fn builder_overrides() {
        let configuration = ConfigurationBuilder::default()
            .solver(SolverBackend::Clarabel)
            .tolerance(1e-5)
            .build()
            .unwrap();
        assert_eq!(configuration.solver, SolverBackend::Clarabel);
        assert!((configuration.tolerance - 1e-5).abs() < 1e-25);
    }

    #[cfg(feature = "microlp")]
    #[test]
    fn microlp_is_default_when_enabled() {
        assert_eq!(SolverBackend::default(), SolverBackend::Microlp);
    }
}
