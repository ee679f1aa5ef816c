//! `cyrisk run` - simulate a scenario or portfolio document.

use std::path::Path;
use std::time::Instant;

use tracing::info;

use risk_core::fx::FxConfig;
use risk_models::portfolio::PortfolioDocument;
use risk_models::scenario::ScenarioDocument;
use risk_plan::{plan_portfolio, FsDocumentSource};
use risk_sim::envelope::to_envelope;
use risk_sim::{
    run_portfolio_simulation, run_scenario_document, PortfolioRunConfig, SimulationResult,
};

use crate::error::{CliError, Result};
use crate::output::print_result;

pub fn run(file: &str, runs: usize, seed: Option<u64>, format: &str, fx: FxConfig) -> Result<()> {
    let text = std::fs::read_to_string(file).map_err(|source| CliError::Io {
        path: file.to_string(),
        source,
    })?;
    let root: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| CliError::InvalidDocument {
            path: file.to_string(),
            source,
        })?;

    let started = Instant::now();
    let mut result = if root.get("portfolio").is_some() {
        run_portfolio(file, &root, runs, seed, fx)?
    } else {
        run_scenario(file, &root, runs, seed, fx)?
    };

    if let Some(metadata) = result.metadata.as_mut() {
        metadata.runtime_ms = Some(started.elapsed().as_secs_f64() * 1000.0);
    }

    match format {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&result).expect("result serialises")
        ),
        "envelope" => println!(
            "{}",
            serde_json::to_string_pretty(&to_envelope(&result)).expect("envelope serialises")
        ),
        _ => print_result(&result),
    }

    if result.success {
        Ok(())
    } else {
        Err(CliError::SimulationFailed(result.errors.join("; ")))
    }
}

fn run_portfolio(
    file: &str,
    root: &serde_json::Value,
    runs: usize,
    seed: Option<u64>,
    fx: FxConfig,
) -> Result<SimulationResult> {
    let document: PortfolioDocument =
        serde_json::from_value(root.clone()).map_err(|source| CliError::InvalidDocument {
            path: file.to_string(),
            source,
        })?;

    // Scenario paths resolve against the portfolio's directory.
    let base_dir = Path::new(file).parent().unwrap_or_else(|| Path::new("."));
    let source = FsDocumentSource::with_base_dir(base_dir);

    let report = plan_portfolio(&document, &source);
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
    if !report.ok {
        for error in &report.errors {
            eprintln!("{error}");
        }
        return Ok(SimulationResult::failure(
            report.errors.iter().map(|e| e.to_string()).collect(),
        ));
    }

    let plan = report.plan.expect("ok report carries a plan");
    info!(scenarios = plan.scenarios.len(), runs, "portfolio planned");

    let config = PortfolioRunConfig {
        n_trials: runs,
        seed,
        fx,
        ..Default::default()
    };
    Ok(run_portfolio_simulation(&plan, &config))
}

fn run_scenario(
    file: &str,
    root: &serde_json::Value,
    runs: usize,
    seed: Option<u64>,
    fx: FxConfig,
) -> Result<SimulationResult> {
    let document: ScenarioDocument =
        serde_json::from_value(root.clone()).map_err(|source| CliError::InvalidDocument {
            path: file.to_string(),
            source,
        })?;
    Ok(run_scenario_document(&document, runs, seed, &fx))
}
