//! Scenario documents: threat frequency and loss severity assumptions.
//!
//! A scenario is immutable once loaded and carries no asset or exposure
//! data; binding to assets happens in the portfolio.

use serde::{Deserialize, Serialize};

use risk_core::types::currency::Currency;

use crate::meta::Meta;
use crate::numberish;
use crate::portfolio::Coverage;

/// Top-level scenario document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    /// Document format version.
    pub version: String,
    #[serde(default)]
    pub meta: Meta,
    pub scenario: ScenarioSpec,
}

/// The scenario body: frequency, severity and optional control references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub frequency: FrequencySpec,
    pub severity: SeveritySpec,
    /// Controls this threat is sensitive to, with optional scenario-scoped
    /// applicability factors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<ControlRef>,
}

/// Exposure denominator for a frequency model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyBasis {
    /// Event rate applies to the organisation as a whole.
    PerOrganizationPerYear,
    /// Event rate applies per exposure unit; cardinality scales the rate.
    PerAssetUnitPerYear,
}

/// Frequency model selection and parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencySpec {
    pub basis: FrequencyBasis,
    /// Model name: `poisson`, `gamma`, or `hierarchical_gamma_poisson`.
    pub model: String,
    #[serde(default)]
    pub parameters: FrequencyParams,
}

/// Union of the parameters accepted by the frequency models.
///
/// Which fields are required depends on the model; the sampler validates at
/// run time so that a planner pass can still succeed on documents using
/// models this engine build does not know.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyParams {
    /// Poisson event rate per basis unit per year.
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub lambda: Option<f64>,
    /// Gamma shape (direct gamma frequency proxy).
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub shape: Option<f64>,
    /// Gamma scale (direct gamma frequency proxy).
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Latent-rate gamma shape (hierarchical gamma-Poisson).
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub alpha_base: Option<f64>,
    /// Latent-rate gamma scale (hierarchical gamma-Poisson).
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub beta_base: Option<f64>,
}

/// Severity model selection, parameters and optional mixture components.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeveritySpec {
    /// Model name: `lognormal`, `gamma`, or `mixture`.
    pub model: String,
    #[serde(default)]
    pub parameters: SeverityParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<SeverityComponent>>,
}

/// Union of the parameters accepted by the severity models.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityParams {
    /// Lognormal median in `currency` units (preferred over `mu`).
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Lognormal log-space location.
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub mu: Option<f64>,
    /// Lognormal log-space dispersion.
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
    /// Gamma shape.
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub shape: Option<f64>,
    /// Gamma scale in `currency` units.
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Currency the monetary parameters are expressed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    /// Observed single-event losses for lognormal auto-calibration.
    #[serde(default, deserialize_with = "numberish::opt_vec", skip_serializing_if = "Option::is_none")]
    pub single_losses: Option<Vec<f64>>,
}

/// One component of a mixture severity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityComponent {
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lognormal: Option<SeverityParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<SeverityParams>,
}

/// Reference from a scenario to a control.
///
/// Documents may use the short string form (`"edr"`) or the structured form
/// with scenario-scoped applicability factors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlRef {
    /// Bare control id; all factors default to the multiplicative identity.
    Plain(String),
    /// Control id plus scenario-scoped factors.
    Detailed(DetailedControlRef),
}

impl ControlRef {
    /// The canonical control id regardless of form.
    pub fn id(&self) -> &str {
        match self {
            ControlRef::Plain(id) => id,
            ControlRef::Detailed(detail) => &detail.id,
        }
    }
}

/// Structured control reference with scenario-scoped factors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedControlRef {
    pub id: String,
    /// Multiplier on inventory implementation effectiveness (0..1).
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub effectiveness_factor: Option<f64>,
    /// Multiplier on inventory coverage, with its own basis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_factor: Option<Coverage>,
    /// Potency of the control against this specific threat (0..1).
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub potency_factor: Option<f64>,
}
