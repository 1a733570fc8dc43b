//! Derived physiological metrics of a solved growth model
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::metabolic_model::model::GrowthFluxes;
use crate::optimize::expression::LinearExpression;
use crate::optimize::{OptimizationStatus, ProblemSolution, SolutionError};

/// Dry weight gained per umol of growth associated ATP (ug/umol)
pub const GROWTH_MASS_PER_ATP: f64 = 28.8;
/// Micrograms per gram
pub const MICROGRAMS_PER_GRAM: f64 = 1e6;
/// Length of the growth window reported alongside the per minute rate (min)
pub const GROWTH_WINDOW_MINUTES: f64 = 90.;

const FLUX_UNIT: &str = "umol/gDW*min";

/// Metrics computed from an optimal flux distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthReport {
    /// atpgrow + atpmaint
    pub atpase_velocity: f64,
    /// nadphox + os
    pub nadph_oxidation_velocity: f64,
    /// Dry weight gained per minute, in percent
    pub growth_percent_per_minute: f64,
    /// Dry weight gained over [`GROWTH_WINDOW_MINUTES`], in percent
    pub growth_percent_per_window: f64,
    /// Flux through glucose-6-phosphate isomerase
    pub glycolysis_rate: f64,
    /// Flux through glucose-6-phosphate dehydrogenase
    pub pentose_phosphate_rate: f64,
    /// Net ATP produced per glucose taken up
    pub atp_per_glucose: f64,
    /// NADPH produced per glucose taken up
    pub nadph_per_glucose: f64,
    /// Flux through the production reaction
    pub production_rate: f64,
    /// 2 tca + pdc + gnd
    pub co2_production_rate: f64,
    /// ATP spent maintaining enzymes
    pub protein_maintenance_atp: f64,
}

impl GrowthReport {
    /// Compute the report from a solution of the growth model
    ///
    /// Fails with [`SolutionError::NoSolution`] unless the solver reported
    /// [`OptimizationStatus::Optimal`] (an `AlmostOptimal` point is not reported) and with
    /// [`SolutionError::DivisionByZero`] if no glucose is taken up.
    pub fn compute(
        fluxes: &GrowthFluxes,
        solution: &ProblemSolution,
    ) -> Result<Self, SolutionError> {
        if solution.status != OptimizationStatus::Optimal {
            return Err(SolutionError::NoSolution {
                status: solution.status,
            });
        }
        let f = fluxes;
        let growth_atp: LinearExpression = f.atpgrow + f.atpmaint + f.hxk + f.pfk;
        let growth_percent_per_minute = GROWTH_MASS_PER_ATP * solution.evaluate(&growth_atp)?
            / MICROGRAMS_PER_GRAM
            * 100.;
        let net_atp = f.pgk + f.pyk + f.tca + 2.5 * f.etc1 + 1.5 * f.etc2 - f.hxk - f.pfk;
        let glucose: LinearExpression = f.hxt.into();

        Ok(GrowthReport {
            atpase_velocity: solution.evaluate(&(f.atpgrow + f.atpmaint))?,
            nadph_oxidation_velocity: solution.evaluate(&(f.nadphox + f.os))?,
            growth_percent_per_minute,
            growth_percent_per_window: growth_percent_per_minute * GROWTH_WINDOW_MINUTES,
            glycolysis_rate: solution.value(f.pgi)?,
            pentose_phosphate_rate: solution.value(f.zwf)?,
            atp_per_glucose: solution.ratio(&net_atp, &glucose)?,
            nadph_per_glucose: solution.ratio(&(f.gnd + f.zwf), &glucose)?,
            production_rate: solution.value(f.collection)?,
            co2_production_rate: solution.evaluate(&(2. * f.tca + f.pdc + f.gnd))?,
            protein_maintenance_atp: solution.value(f.atpprot)?,
        })
    }
}

impl Display for GrowthReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ATPase velocity: {} {}", self.atpase_velocity, FLUX_UNIT)?;
        writeln!(
            f,
            "NADPH oxidation velocity: {} {}",
            self.nadph_oxidation_velocity, FLUX_UNIT
        )?;
        writeln!(
            f,
            "Growth Percent per minute: {}",
            self.growth_percent_per_minute
        )?;
        writeln!(
            f,
            "Growth Percent per {} minutes: {}",
            GROWTH_WINDOW_MINUTES, self.growth_percent_per_window
        )?;
        writeln!(f, "Glycolysis rate: {} {}", self.glycolysis_rate, FLUX_UNIT)?;
        writeln!(
            f,
            "Pentose Phosphate Pathway rate: {} {}",
            self.pentose_phosphate_rate, FLUX_UNIT
        )?;
        writeln!(f, "ATP/glucose: {}", self.atp_per_glucose)?;
        writeln!(f, "NADPH/glucose: {}", self.nadph_per_glucose)?;
        writeln!(f, "Production rate: {} {}", self.production_rate, FLUX_UNIT)?;
        writeln!(
            f,
            "CO2 production rate: {} {}",
            self.co2_production_rate, FLUX_UNIT
        )?;
        write!(
            f,
            "Maintenance protein ATP cost: {} {}",
            self.protein_maintenance_atp, FLUX_UNIT
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Configuration;
    use crate::metabolic_model::model::GrowthModel;
    use crate::metabolic_model::parameters::GrowthParametersBuilder;
    use approx::assert_abs_diff_eq;

    #[test]
    fn baseline_report() {
        let mut model = GrowthModel::baseline().unwrap();
        model.solve().unwrap();
        let report = model.report().unwrap();
        let zwf = 13.792099799844934;
        assert_abs_diff_eq!(report.growth_percent_per_minute, 1.2437128987168835, epsilon = 1e-8);
        assert_abs_diff_eq!(
            report.growth_percent_per_window,
            1.2437128987168835 * 90.,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(report.atp_per_glucose, 27.096142293388468, epsilon = 1e-6);
        assert_abs_diff_eq!(report.nadph_per_glucose, 1.8389466399793244, epsilon = 1e-6);
        assert_abs_diff_eq!(report.co2_production_rate, 90., epsilon = 1e-6);
        assert_abs_diff_eq!(report.pentose_phosphate_rate, zwf, epsilon = 1e-6);
        assert_abs_diff_eq!(report.glycolysis_rate, 15. - zwf, epsilon = 1e-6);
        assert_abs_diff_eq!(report.atpase_velocity, 391.4421230988662 + 15., epsilon = 1e-6);
        assert_abs_diff_eq!(report.nadph_oxidation_velocity, 2. * zwf, epsilon = 1e-6);
        assert_abs_diff_eq!(report.production_rate, 25., epsilon = 1e-6);
        assert_abs_diff_eq!(
            report.protein_maintenance_atp,
            1.1301960784313725e-05,
            epsilon = 1e-9
        );
    }

    #[test]
    fn report_lines() {
        let mut model = GrowthModel::baseline().unwrap();
        model.solve().unwrap();
        let text = model.report().unwrap().to_string();
        let labels: Vec<&str> = text
            .lines()
            .map(|line| line.split(':').next().unwrap())
            .collect();
        assert_eq!(
            labels,
            [
                "ATPase velocity",
                "NADPH oxidation velocity",
                "Growth Percent per minute",
                "Growth Percent per 90 minutes",
                "Glycolysis rate",
                "Pentose Phosphate Pathway rate",
                "ATP/glucose",
                "NADPH/glucose",
                "Production rate",
                "CO2 production rate",
                "Maintenance protein ATP cost",
            ]
        );
        assert!(text.starts_with("ATPase velocity: "));
        assert!(text.lines().next().unwrap().ends_with(" umol/gDW*min"));
    }

    #[test]
    fn unsolved_model_has_no_report() {
        let model = GrowthModel::baseline().unwrap();
        assert_eq!(
            model.report(),
            Err(SolutionError::NoSolution {
                status: OptimizationStatus::Unoptimized
            })
        );
    }

    #[test]
    fn almost_optimal_point_has_no_report() {
        let mut model = GrowthModel::baseline().unwrap();
        let mut solution = model.solve().unwrap();
        assert!(GrowthReport::compute(model.fluxes(), &solution).is_ok());

        // Same values, but the solver only reached its reduced tolerances
        solution.status = OptimizationStatus::AlmostOptimal;
        assert!(solution.has_values());
        assert_eq!(
            GrowthReport::compute(model.fluxes(), &solution),
            Err(SolutionError::NoSolution {
                status: OptimizationStatus::AlmostOptimal
            })
        );
    }

    #[test]
    fn zero_glucose_uptake_ratio() {
        let params = GrowthParametersBuilder::default()
            .glucose_uptake_max(0.)
            .build()
            .unwrap();
        let model = GrowthModel::build(params, Configuration::default()).unwrap();
        let fluxes = model.fluxes();
        // An optimal point with no glucose uptake, as a solver would report it
        let values = model
            .problem()
            .variables()
            .map(|v| (v.id.clone(), v.lower_bound))
            .collect();
        let mut solution = ProblemSolution::from_status(OptimizationStatus::Optimal);
        solution.variable_values = Some(values);
        assert_eq!(
            GrowthReport::compute(fluxes, &solution),
            Err(SolutionError::DivisionByZero)
        );
    }
}
