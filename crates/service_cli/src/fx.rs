//! FX configuration document loading.
//!
//! The FX config is its own small document type:
//!
//! ```json
//! {
//!   "base_currency": "USD",
//!   "output_currency": "EUR",
//!   "rates": {"EUR": 1.08, "GBP": 1.27},
//!   "as_of": "2025-06-30"
//! }
//! ```
//!
//! Rates overlay the engine defaults, so partial tables are fine. A config
//! that cannot be loaded falls back to defaults with a warning; a wrong
//! rate file should never abort a run silently mid-analysis.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use risk_core::fx::FxConfig;
use risk_core::types::currency::Currency;

/// On-disk FX configuration shape.
#[derive(Debug, Deserialize)]
struct FxConfigDocument {
    #[serde(default)]
    base_currency: Option<Currency>,
    #[serde(default)]
    output_currency: Option<Currency>,
    #[serde(default)]
    rates: HashMap<Currency, f64>,
    #[serde(default)]
    as_of: Option<NaiveDate>,
}

/// Loads an FX config document, falling back to defaults on any failure.
pub fn load_fx_config(path: Option<&str>) -> FxConfig {
    let Some(path) = path else {
        return FxConfig::default();
    };

    match try_load(path) {
        Ok(config) => config,
        Err(reason) => {
            warn!(path, %reason, "could not load FX config; using defaults");
            FxConfig::default()
        }
    }
}

fn try_load(path: &str) -> Result<FxConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let doc: FxConfigDocument = serde_json::from_str(&text).map_err(|e| e.to_string())?;

    let base = doc.base_currency.unwrap_or(Currency::USD);
    let output = doc.output_currency.unwrap_or(base);
    let mut config = FxConfig::new(base, output).with_rates(doc.rates);
    config.as_of = doc.as_of;
    Ok(config)
}
