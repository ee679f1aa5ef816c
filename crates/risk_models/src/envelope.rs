//! Engine-agnostic result envelope.
//!
//! A stable interchange format for simulation outputs: named measures
//! (point statistics, possibly parameterised) plus distribution artifacts
//! (histogram, raw samples). Any conforming engine can emit this envelope,
//! which decouples downstream reporting from the engine internals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currency unit attached to monetary measures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrencyUnit {
    /// ISO 4217 code.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// Identification of the producing engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Run-level execution facts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

/// Echo of the input document identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Units shared by every measure in the envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Units {
    pub currency: CurrencyUnit,
    /// Loss horizon the measures refer to (always `annual` here).
    pub horizon: String,
}

/// A named point statistic.
///
/// Measures with the same id may repeat with different `parameters`
/// (e.g. `loss.var` at levels 0.95/0.99/0.999).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub id: String,
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<CurrencyUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// A distribution artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    /// Fixed-bin histogram of loss samples.
    Histogram {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<CurrencyUnit>,
        bin_edges: Vec<f64>,
        counts: Vec<u64>,
        binning: serde_json::Value,
    },
    /// Raw (possibly truncated) loss samples.
    Samples {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<CurrencyUnit>,
        values: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sample_count_total: Option<u64>,
        sample_count_returned: u64,
        sampling: serde_json::Value,
    },
}

/// Measures plus artifacts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsBlock {
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// The envelope body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeResult {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub engine: EngineInfo,
    #[serde(default)]
    pub run: RunInfo,
    #[serde(default)]
    pub inputs: InputInfo,
    pub units: Units,
    #[serde(default)]
    pub results: ResultsBlock,
}

/// Top-level envelope document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResultEnvelope {
    pub result: EnvelopeResult,
}
