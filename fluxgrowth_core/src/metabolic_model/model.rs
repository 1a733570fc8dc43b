//! This module provides the growth model of yeast central carbon metabolism
//!
//! The network covers glycolysis, the pentose phosphate pathway, a lumped TCA cycle
//! with electron transport, and ATP/NADPH bookkeeping fluxes. Every metabolite is held
//! at steady state by one balance constraint, derived from the stoichiometry of the
//! reactions. The energy carriers are balanced in pairs (ATP and ADP, NAD and NADH,
//! NADP and NADPH, FAD and FADH2), one of each pair being redundant with the other.
use indexmap::IndexMap;
use log::info;
use thiserror::Error;

use crate::configuration::Configuration;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::parameters::GrowthParameters;
use crate::metabolic_model::reaction::{Reaction, ReactionBuilder, ReactionBuilderError};
use crate::metabolic_model::report::GrowthReport;
use crate::optimize::constraint::Relation;
use crate::optimize::expression::LinearExpression;
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::variable::VariableHandle;
use crate::optimize::{ProblemSolution, SolutionError};

/// Weight of the ATP consuming fluxes in the cofactor coupling constraint
pub const COUPLING_ATP_COEFFICIENT: f64 = 0.39999999999999997;
/// Weight of NADPH oxidation in the cofactor coupling constraint, close to 464/15
pub const COUPLING_NADPH_COEFFICIENT: f64 = 30.933333244382023;
/// Id of the cofactor coupling constraint
pub const COUPLING_CONSTRAINT: &str = "cofactor_coupling";

/// Metabolites held at steady state, in balance order
const METABOLITES: [(&str, &str); 27] = [
    ("GLC", "glucose"),
    ("G6P", "glucose-6-phosphate"),
    ("F6P", "fructose-6-phosphate"),
    ("F16bP", "fructose-1,6-bisphosphate"),
    ("DHAP", "dihydroxyacetone phosphate"),
    ("GAP", "glyceraldehyde-3-phosphate"),
    ("BPG", "1,3-bisphosphoglycerate"),
    ("P3G", "3-phosphoglycerate"),
    ("P2G", "2-phosphoglycerate"),
    ("PEP", "phosphoenolpyruvate"),
    ("PYR", "pyruvate"),
    ("ACALD", "acetaldehyde"),
    ("FADH2", "FADH2"),
    ("FAD", "FAD"),
    ("NAD", "NAD+"),
    ("NADH", "NADH"),
    ("ATP", "ATP"),
    ("ADP", "ADP"),
    ("G6L", "6-phosphogluconolactone"),
    ("P6G", "6-phosphogluconate"),
    ("NADPH", "NADPH"),
    ("NADP", "NADP+"),
    ("Ru5P", "ribulose-5-phosphate"),
    ("X5P", "xylulose-5-phosphate"),
    ("R5P", "ribose-5-phosphate"),
    ("E4P", "erythrose-4-phosphate"),
    ("S7P", "sedoheptulose-7-phosphate"),
];

/// Handles of the fluxes read by the objective, the coupling constraint and the report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthFluxes {
    /// Non growth associated maintenance ATP
    pub atpmaint: VariableHandle,
    /// Growth associated ATP, the objective
    pub atpgrow: VariableHandle,
    /// ATP spent maintaining the glycolytic and pentose phosphate enzymes
    pub atpprot: VariableHandle,
    /// Glucose uptake
    pub hxt: VariableHandle,
    /// Hexokinase
    pub hxk: VariableHandle,
    /// Phosphofructokinase
    pub pfk: VariableHandle,
    /// Glucose-6-phosphate isomerase
    pub pgi: VariableHandle,
    /// Phosphoglycerate kinase
    pub pgk: VariableHandle,
    /// Pyruvate kinase
    pub pyk: VariableHandle,
    /// Pyruvate decarboxylase
    pub pdc: VariableHandle,
    /// Lumped TCA cycle
    pub tca: VariableHandle,
    /// Electron transport from NADH
    pub etc1: VariableHandle,
    /// Electron transport from FADH2
    pub etc2: VariableHandle,
    /// Glucose-6-phosphate dehydrogenase
    pub zwf: VariableHandle,
    /// 6-phosphogluconate dehydrogenase
    pub gnd: VariableHandle,
    /// NADPH oxidation weighed against growth ATP by the cofactor coupling
    pub nadphox: VariableHandle,
    /// Other NADPH oxidation, bounded below by a fixed demand
    pub os: VariableHandle,
    /// Production, bounded below by the minimum production rate
    pub collection: VariableHandle,
}

impl GrowthFluxes {
    fn from_handles(handles: &IndexMap<String, VariableHandle>) -> Result<Self, ModelError> {
        let flux = |id: &str| {
            handles
                .get(id)
                .copied()
                .ok_or_else(|| ModelError::MissingReaction(id.to_string()))
        };
        Ok(GrowthFluxes {
            atpmaint: flux("atpmaint")?,
            atpgrow: flux("atpgrow")?,
            atpprot: flux("atpprot")?,
            hxt: flux("hxt")?,
            hxk: flux("hxk")?,
            pfk: flux("pfk")?,
            pgi: flux("pgi")?,
            pgk: flux("pgk")?,
            pyk: flux("pyk")?,
            pdc: flux("pdc")?,
            tca: flux("tca")?,
            etc1: flux("etc1")?,
            etc2: flux("etc2")?,
            zwf: flux("zwf")?,
            gnd: flux("gnd")?,
            nadphox: flux("nadphox")?,
            os: flux("os")?,
            collection: flux("collection")?,
        })
    }
}

/// Flux balance model of yeast central carbon metabolism maximizing growth ATP
///
/// Each call to [`GrowthModel::build`] returns an independent model, models can be
/// modified and solved without affecting each other.
///
/// # Examples
/// ```rust
/// use fluxgrowth_core::metabolic_model::model::GrowthModel;
/// let mut model = GrowthModel::baseline().unwrap();
/// let solution = model.solve().unwrap();
/// assert!(solution.status.is_optimal());
/// let report = model.report().unwrap();
/// assert!(report.growth_percent_per_minute > 0.);
/// ```
#[derive(Debug, Clone)]
pub struct GrowthModel {
    /// Reactions of the network, in declaration order
    reactions: IndexMap<String, Reaction>,
    /// Metabolites held at steady state, in balance order
    metabolites: IndexMap<String, Metabolite>,
    /// Flux variable of every reaction
    handles: IndexMap<String, VariableHandle>,
    /// Named handles used by the objective and the report
    fluxes: GrowthFluxes,
    /// Parameters the model was built from
    parameters: GrowthParameters,
    /// Underlying optimization problem
    problem: Problem,
}

impl GrowthModel {
    /// Build the model with default parameters and configuration
    pub fn baseline() -> Result<Self, ModelError> {
        Self::build(GrowthParameters::default(), Configuration::default())
    }

    /// Build the model from parameters and a solver configuration
    pub fn build(
        parameters: GrowthParameters,
        configuration: Configuration,
    ) -> Result<Self, ModelError> {
        let mut problem = Problem::with_configuration(configuration);
        problem.set_name("growth");

        let reactions: IndexMap<String, Reaction> = growth_reactions(&parameters)?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        let metabolites: IndexMap<String, Metabolite> = METABOLITES
            .iter()
            .map(|(id, name)| (id.to_string(), Metabolite::new(id, name)))
            .collect();

        let mut handles = IndexMap::with_capacity(reactions.len());
        for reaction in reactions.values() {
            handles.insert(reaction.id.clone(), reaction.declare(&mut problem)?);
        }

        // Steady state, one equality per metabolite
        for metabolite in metabolites.values() {
            let balance = balance_expression(&reactions, &handles, &metabolite.id);
            problem.add_constraint(&metabolite.id, balance, Relation::Equal, 0.)?;
        }

        let fluxes = GrowthFluxes::from_handles(&handles)?;

        // ATP consumption is limited by the NADPH oxidation capacity
        let atp_demand =
            fluxes.atpgrow + fluxes.atpmaint + fluxes.pfk + fluxes.hxk + fluxes.atpprot;
        problem.add_constraint(
            COUPLING_CONSTRAINT,
            COUPLING_ATP_COEFFICIENT * atp_demand
                - COUPLING_NADPH_COEFFICIENT * fluxes.nadphox,
            Relation::LessOrEqual,
            0.,
        )?;

        problem.maximize(fluxes.atpgrow.into())?;
        info!(
            "Built growth model with {} reactions and {} metabolites",
            reactions.len(),
            metabolites.len()
        );

        Ok(GrowthModel {
            reactions,
            metabolites,
            handles,
            fluxes,
            parameters,
            problem,
        })
    }

    // region Accessors
    /// The reactions of the network
    pub fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values()
    }

    /// The metabolites of the network
    pub fn metabolites(&self) -> impl Iterator<Item = &Metabolite> {
        self.metabolites.values()
    }

    /// Handle of the flux variable of a reaction
    pub fn flux(&self, reaction_id: &str) -> Result<VariableHandle, ModelError> {
        self.handles
            .get(reaction_id)
            .copied()
            .ok_or_else(|| ModelError::MissingReaction(reaction_id.to_string()))
    }

    /// Handles of the fluxes used by the objective and the report
    pub fn fluxes(&self) -> &GrowthFluxes {
        &self.fluxes
    }

    /// Parameters the model was built from, kept in step with bound changes
    pub fn parameters(&self) -> &GrowthParameters {
        &self.parameters
    }

    /// The underlying optimization problem
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Mutable access to the underlying problem, for bound sweeps
    pub fn problem_mut(&mut self) -> &mut Problem {
        &mut self.problem
    }

    /// Steady state balance of a metabolite, net production minus consumption
    pub fn balance(&self, metabolite_id: &str) -> Result<LinearExpression, ModelError> {
        if !self.metabolites.contains_key(metabolite_id) {
            return Err(ModelError::MissingMetabolite(metabolite_id.to_string()));
        }
        Ok(balance_expression(
            &self.reactions,
            &self.handles,
            metabolite_id,
        ))
    }
    // endregion Accessors

    /// Change the glucose uptake bounds
    pub fn set_glucose_uptake(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        self.problem
            .update_variable_bounds(self.fluxes.hxt, lower_bound, upper_bound)?;
        self.parameters.glucose_uptake_min = lower_bound;
        self.parameters.glucose_uptake_max = upper_bound;
        Ok(())
    }

    /// Solve the model
    pub fn solve(&mut self) -> Result<ProblemSolution, ModelError> {
        Ok(self.problem.solve()?)
    }

    /// Report of the last solve, fails with [`SolutionError::NoSolution`] unless the
    /// model was solved to optimality
    pub fn report(&self) -> Result<GrowthReport, SolutionError> {
        let solution = self.problem.solution().ok_or(SolutionError::NoSolution {
            status: self.problem.status(),
        })?;
        GrowthReport::compute(&self.fluxes, solution)
    }
}

fn balance_expression(
    reactions: &IndexMap<String, Reaction>,
    handles: &IndexMap<String, VariableHandle>,
    metabolite_id: &str,
) -> LinearExpression {
    reactions
        .values()
        .filter_map(|reaction| {
            let coefficient = reaction.metabolites.get(metabolite_id)?;
            let handle = handles.get(&reaction.id)?;
            Some(*coefficient * *handle)
        })
        .sum()
}

/// Build one reaction of the network
fn reaction(
    id: &str,
    name: &str,
    subsystem: &str,
    bounds: (f64, f64),
    stoichiometry: &[(&str, f64)],
) -> Result<Reaction, ModelError> {
    Ok(ReactionBuilder::default()
        .id(id)
        .name(name)
        .subsystem(subsystem)
        .lower_bound(bounds.0)
        .upper_bound(bounds.1)
        .metabolites(
            stoichiometry
                .iter()
                .map(|(m, c)| (m.to_string(), *c))
                .collect::<IndexMap<String, f64>>(),
        )
        .build()?)
}

/// The reactions of the network, bounds taken from `parameters`
fn growth_reactions(parameters: &GrowthParameters) -> Result<Vec<Reaction>, ModelError> {
    const INF: f64 = f64::INFINITY;
    const ENERGY: &str = "energy";
    const GLYCOLYSIS: &str = "glycolysis";
    const PPP: &str = "pentose phosphate pathway";
    const RESPIRATION: &str = "respiration";
    let nonnegative = (0., INF);

    Ok(vec![
        reaction(
            "atpmaint",
            "maintenance ATP",
            ENERGY,
            (parameters.maintenance_atp, INF),
            &[("ATP", -1.), ("ADP", 1.)],
        )?,
        reaction(
            "atpgrow",
            "growth ATP",
            ENERGY,
            nonnegative,
            &[("ATP", -1.), ("ADP", 1.)],
        )?,
        reaction(
            "fba",
            "fructose-bisphosphate aldolase",
            GLYCOLYSIS,
            nonnegative,
            &[("F16bP", -1.), ("DHAP", 1.), ("GAP", 1.)],
        )?,
        reaction(
            "gpm",
            "phosphoglycerate mutase",
            GLYCOLYSIS,
            nonnegative,
            &[("P3G", -1.), ("P2G", 1.)],
        )?,
        reaction(
            "hxk",
            "hexokinase",
            GLYCOLYSIS,
            (0., parameters.hexokinase_max),
            &[("GLC", -1.), ("G6P", 1.), ("ATP", -1.), ("ADP", 1.)],
        )?,
        reaction(
            "pdc",
            "pyruvate decarboxylase",
            GLYCOLYSIS,
            nonnegative,
            &[("PYR", -1.), ("ACALD", 1.), ("NAD", -1.), ("NADH", 1.)],
        )?,
        reaction(
            "pfk",
            "phosphofructokinase",
            GLYCOLYSIS,
            (0., parameters.phosphofructokinase_max),
            &[("F6P", -1.), ("F16bP", 1.), ("ATP", -1.), ("ADP", 1.)],
        )?,
        reaction(
            "pgi",
            "glucose-6-phosphate isomerase",
            GLYCOLYSIS,
            nonnegative,
            &[("G6P", -1.), ("F6P", 1.)],
        )?,
        reaction(
            "pgk",
            "phosphoglycerate kinase",
            GLYCOLYSIS,
            nonnegative,
            &[("BPG", -1.), ("P3G", 1.), ("ATP", 1.), ("ADP", -1.)],
        )?,
        reaction(
            "pyk",
            "pyruvate kinase",
            GLYCOLYSIS,
            nonnegative,
            &[("PEP", -1.), ("PYR", 1.), ("ATP", 1.), ("ADP", -1.)],
        )?,
        reaction(
            "gapdh",
            "glyceraldehyde-3-phosphate dehydrogenase",
            GLYCOLYSIS,
            nonnegative,
            &[("GAP", -1.), ("BPG", 1.), ("NAD", -1.), ("NADH", 1.)],
        )?,
        reaction(
            "tpi",
            "triose-phosphate isomerase",
            GLYCOLYSIS,
            nonnegative,
            &[("DHAP", -1.), ("GAP", 1.)],
        )?,
        reaction(
            "ugp",
            "UTP-glucose-1-phosphate uridylyltransferase",
            GLYCOLYSIS,
            nonnegative,
            &[],
        )?,
        reaction(
            "hxt",
            "hexose transport",
            GLYCOLYSIS,
            (parameters.glucose_uptake_min, parameters.glucose_uptake_max),
            &[("GLC", 1.)],
        )?,
        reaction(
            "gnd",
            "6-phosphogluconate dehydrogenase",
            PPP,
            nonnegative,
            &[("P6G", -1.), ("Ru5P", 1.), ("NADPH", 1.), ("NADP", -1.)],
        )?,
        reaction(
            "rki",
            "ribose-5-phosphate isomerase",
            PPP,
            nonnegative,
            &[("Ru5P", -1.), ("R5P", 1.)],
        )?,
        reaction(
            "rpe",
            "ribulose-phosphate 3-epimerase",
            PPP,
            nonnegative,
            &[("Ru5P", -1.), ("X5P", 1.)],
        )?,
        reaction(
            "sol",
            "6-phosphogluconolactonase",
            PPP,
            nonnegative,
            &[("G6L", -1.), ("P6G", 1.)],
        )?,
        reaction(
            "tal",
            "transaldolase",
            PPP,
            nonnegative,
            &[("GAP", -1.), ("S7P", -1.), ("F6P", 1.), ("E4P", 1.)],
        )?,
        reaction(
            "tklef",
            "transketolase (E4P)",
            PPP,
            (-INF, INF),
            &[("X5P", -1.), ("E4P", -1.), ("F6P", 1.), ("GAP", 1.)],
        )?,
        reaction(
            "tklrs",
            "transketolase (R5P)",
            PPP,
            (-INF, INF),
            &[("X5P", -1.), ("R5P", -1.), ("GAP", 1.), ("S7P", 1.)],
        )?,
        reaction(
            "zwf",
            "glucose-6-phosphate dehydrogenase",
            PPP,
            (0., parameters.g6p_dehydrogenase_max),
            &[("G6P", -1.), ("G6L", 1.), ("NADPH", 1.), ("NADP", -1.)],
        )?,
        reaction(
            "eno",
            "enolase",
            GLYCOLYSIS,
            nonnegative,
            &[("P2G", -1.), ("PEP", 1.)],
        )?,
        reaction(
            "nadphox",
            "NADPH oxidation",
            ENERGY,
            nonnegative,
            &[("NADPH", -1.), ("NADP", 1.)],
        )?,
        reaction(
            "tca",
            "TCA cycle",
            RESPIRATION,
            nonnegative,
            &[
                ("ACALD", -1.),
                ("FADH2", 1.),
                ("FAD", -1.),
                ("NAD", -3.),
                ("NADH", 3.),
                ("ATP", 1.),
                ("ADP", -1.),
            ],
        )?,
        reaction(
            "etc1",
            "electron transport (NADH)",
            RESPIRATION,
            nonnegative,
            &[("NADH", -1.), ("NAD", 1.), ("ATP", 2.5), ("ADP", -2.5)],
        )?,
        reaction(
            "etc2",
            "electron transport (FADH2)",
            RESPIRATION,
            nonnegative,
            &[("FADH2", -1.), ("FAD", 1.), ("ATP", 1.5), ("ADP", -1.5)],
        )?,
        reaction(
            "os",
            "other NADPH oxidation",
            ENERGY,
            (parameters.other_nadph_oxidation, INF),
            &[("NADPH", -1.), ("NADP", 1.)],
        )?,
        reaction(
            "collection",
            "production",
            ENERGY,
            (parameters.production_min, INF),
            &[],
        )?,
        reaction(
            "atpprot",
            "protein maintenance ATP",
            ENERGY,
            (parameters.protein_maintenance_atp(), INF),
            &[("ATP", -1.), ("ADP", 1.)],
        )?,
    ])
}

/// Errors when building or reading the growth model
#[derive(Error, Debug)]
pub enum ModelError {
    /// Error raised while building the optimization problem
    #[error(transparent)]
    Problem(#[from] ProblemError),
    /// Error raised while reading the solution
    #[error(transparent)]
    Solution(#[from] SolutionError),
    /// A reaction could not be built
    #[error("Failed to build reaction: {0}")]
    Reaction(#[from] ReactionBuilderError),
    /// No reaction with this id in the model
    #[error("No reaction with id {0} in the model")]
    MissingReaction(String),
    /// No metabolite with this id in the model
    #[error("No metabolite with id {0} in the model")]
    MissingMetabolite(String),
}
