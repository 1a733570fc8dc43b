//! Biological parameters of the growth model
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

// region Constants
/// Glucose uptake capacity of the hexose transporters (umol/gDW*min)
pub const GLUCOSE_UPTAKE_MAX: f64 = 15.;
/// Capacity of hexokinase, phosphofructokinase and glucose-6-phosphate dehydrogenase
/// (umol/gDW*min)
pub const ENZYME_CAPACITY: f64 = 15.;
/// ATP spent on cell maintenance (umol/gDW*min)
pub const MAINTENANCE_ATP: f64 = 15.;
/// NADPH oxidized outside the modelled pathways (umol/gDW*min)
pub const OTHER_NADPH_OXIDATION: f64 = 22.;
/// Minimal production rate (umol/gDW*min)
pub const PRODUCTION_MIN: f64 = 25.;
/// Specific activity of the maintained enzymes (umol/gDW*min)
pub const PROTEIN_SPECIFIC_ACTIVITY: f64 = 22.;
/// Enzyme turnover number (1/s)
pub const TURNOVER_NUMBER: f64 = 170.;
/// ATP spent per amino acid incorporated into protein
pub const ATP_PER_AMINO_ACID: f64 = 4.;
/// Protein cost factor of the maintained enzymes, derivation unknown
pub const PROTEIN_COST_FACTOR: f64 = 0.00131;
// endregion Constants

/// Parameters of a [`GrowthModel`](crate::metabolic_model::model::GrowthModel)
///
/// # Examples
/// ```rust
/// use fluxgrowth_core::metabolic_model::parameters::GrowthParametersBuilder;
/// let limited = GrowthParametersBuilder::default()
///     .glucose_uptake_max(10.)
///     .build()
///     .unwrap();
/// assert_eq!(limited.maintenance_atp, 15.);
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct GrowthParameters {
    /// Lower bound of the glucose uptake flux `hxt`
    #[builder(default = "0.")]
    pub glucose_uptake_min: f64,
    /// Upper bound of the glucose uptake flux `hxt`
    #[builder(default = "GLUCOSE_UPTAKE_MAX")]
    pub glucose_uptake_max: f64,
    /// Upper bound of hexokinase `hxk`
    #[builder(default = "ENZYME_CAPACITY")]
    pub hexokinase_max: f64,
    /// Upper bound of phosphofructokinase `pfk`
    #[builder(default = "ENZYME_CAPACITY")]
    pub phosphofructokinase_max: f64,
    /// Upper bound of glucose-6-phosphate dehydrogenase `zwf`
    #[builder(default = "ENZYME_CAPACITY")]
    pub g6p_dehydrogenase_max: f64,
    /// Lower bound of maintenance ATP `atpmaint`
    #[builder(default = "MAINTENANCE_ATP")]
    pub maintenance_atp: f64,
    /// Lower bound of other NADPH oxidation `os`
    #[builder(default = "OTHER_NADPH_OXIDATION")]
    pub other_nadph_oxidation: f64,
    /// Lower bound of the production flux `collection`
    #[builder(default = "PRODUCTION_MIN")]
    pub production_min: f64,
    /// Specific activity used for the protein maintenance cost
    #[builder(default = "PROTEIN_SPECIFIC_ACTIVITY")]
    pub protein_specific_activity: f64,
    /// Turnover number used for the protein maintenance cost
    #[builder(default = "TURNOVER_NUMBER")]
    pub turnover_number: f64,
}

impl GrowthParameters {
    /// Lower bound of the protein maintenance ATP flux `atpprot`
    ///
    /// `4 * 0.00131 * activity / (turnover * 60)`, the turnover number converted to
    /// turnovers per minute.
    pub fn protein_maintenance_atp(&self) -> f64 {
        ATP_PER_AMINO_ACID * PROTEIN_COST_FACTOR * self.protein_specific_activity
            / (self.turnover_number * 60.)
    }
}

impl Default for GrowthParameters {
    fn default() -> Self {
        GrowthParameters {
            glucose_uptake_min: 0.,
            glucose_uptake_max: GLUCOSE_UPTAKE_MAX,
            hexokinase_max: ENZYME_CAPACITY,
            phosphofructokinase_max: ENZYME_CAPACITY,
            g6p_dehydrogenase_max: ENZYME_CAPACITY,
            maintenance_atp: MAINTENANCE_ATP,
            other_nadph_oxidation: OTHER_NADPH_OXIDATION,
            production_min: PRODUCTION_MIN,
            protein_specific_activity: PROTEIN_SPECIFIC_ACTIVITY,
            turnover_number: TURNOVER_NUMBER,
        }
    }
}

impl GrowthParametersBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(turnover) = self.turnover_number {
            if turnover <= 0. || turnover.is_nan() {
                return Err(format!("Turnover number must be positive, got {}", turnover));
            }
        }
        if let (Some(min), Some(max)) = (self.glucose_uptake_min, self.glucose_uptake_max) {
            if min > max {
                return Err(format!(
                    "Glucose uptake bounds [{}, {}] are inverted",
                    min, max
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn builder_defaults_match_default() {
        let built = GrowthParametersBuilder::default().build().unwrap();
        assert_eq!(built, GrowthParameters::default());
    }

    #[test]
    fn protein_maintenance_cost() {
        let params = GrowthParameters::default();
        assert_abs_diff_eq!(
            params.protein_maintenance_atp(),
            1.1301960784313725e-05,
            epsilon = 1e-18
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(GrowthParametersBuilder::default()
            .turnover_number(0.)
            .build()
            .is_err());
        assert!(GrowthParametersBuilder::default()
            .glucose_uptake_min(10.)
            .glucose_uptake_max(5.)
            .build()
            .is_err());
    }

    #[test]
    fn deserialize_partial_json() {
        let params: GrowthParameters =
            serde_json::from_str(r#"{"glucose_uptake_max": 12.5, "maintenance_atp": 10}"#)
                .unwrap();
        assert!((params.glucose_uptake_max - 12.5).abs() < 1e-25);
        assert!((params.maintenance_atp - 10.).abs() < 1e-25);
        assert!((params.turnover_number - TURNOVER_NUMBER).abs() < 1e-25);
    }
}
