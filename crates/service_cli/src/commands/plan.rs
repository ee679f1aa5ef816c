//! `cyrisk plan` - resolve a portfolio and print the plan report.

use std::path::Path;

use risk_models::portfolio::PortfolioDocument;
use risk_plan::{plan_portfolio, FsDocumentSource};

use crate::error::{CliError, Result};

pub fn run(file: &str) -> Result<()> {
    let text = std::fs::read_to_string(file).map_err(|source| CliError::Io {
        path: file.to_string(),
        source,
    })?;
    let document: PortfolioDocument =
        serde_json::from_str(&text).map_err(|source| CliError::InvalidDocument {
            path: file.to_string(),
            source,
        })?;

    let base_dir = Path::new(file).parent().unwrap_or_else(|| Path::new("."));
    let report = plan_portfolio(&document, &FsDocumentSource::with_base_dir(base_dir));

    for warning in &report.warnings {
        println!("{warning}");
    }
    for error in &report.errors {
        println!("{error}");
    }

    if let Some(plan) = &report.plan {
        println!(
            "{}",
            serde_json::to_string_pretty(plan).expect("plan serialises")
        );
        Ok(())
    } else {
        Err(CliError::PlanningFailed(report.errors.len()))
    }
}
