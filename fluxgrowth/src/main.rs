//! Solve the baseline growth model and print its report
use std::process::ExitCode;

use fluxgrowth_core::metabolic_model::model::GrowthModel;
use fluxgrowth_core::optimize::OptimizationStatus;
use log::{debug, error, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn main() -> ExitCode {
    if let Err(e) = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let mut model = match GrowthModel::baseline() {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to build the growth model: {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!("Metabolism and Growth\n{}", model.problem());

    let solution = match model.solve() {
        Ok(solution) => solution,
        Err(e) => {
            error!("Failed to solve the growth model: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Status: {}", solution.status);
    match solution.status {
        OptimizationStatus::Optimal => {}
        OptimizationStatus::AlmostOptimal => {
            warn!("Solver only reached reduced accuracy, not printing the growth report");
            return ExitCode::FAILURE;
        }
        status => {
            error!("No optimal flux distribution, status {}", status);
            return ExitCode::FAILURE;
        }
    }

    match model.report() {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to compute the growth report: {}", e);
            ExitCode::FAILURE
        }
    }
}
