//! Portfolio documents: asset inventories, scenario bindings, control
//! postures, aggregation semantics and dependency structure.

use serde::{Deserialize, Serialize};

use crate::meta::Meta;
use crate::numberish;

/// Top-level portfolio document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioDocument {
    /// Document format version.
    pub version: String,
    #[serde(default)]
    pub meta: Meta,
    pub portfolio: Portfolio,
}

/// The portfolio body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Portfolio-level control inventory (highest precedence).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<PortfolioControl>,
    /// Paths to control catalog packs (known-id registries).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_catalogs: Vec<String>,
    /// Paths to control assessment packs (id → measured posture).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_assessments: Vec<String>,
    pub scenarios: Vec<ScenarioRef>,
    pub semantics: Semantics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<Dependency>,
    /// Declared asset relationships, carried through for reporting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

/// A unit-of-exposure group inside a portfolio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    /// Count of exposure units; must be at least 1 (enforced by the planner).
    #[serde(deserialize_with = "numberish::cardinality")]
    pub cardinality: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality_index: Option<CriticalityIndex>,
}

/// Criticality metadata attached to an asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CriticalityIndex {
    /// Scheme the value is measured on (e.g. `ordinal`, `cvss_like`).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// A control posture entry in the portfolio inventory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioControl {
    /// Canonical control id, unique per portfolio.
    pub id: String,
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub implementation_effectiveness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
    /// Probability the control is operational on a given trial.
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub reliability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affects: Option<ControlSurface>,
}

/// Breadth of a control, as a fraction of some basis population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    #[serde(deserialize_with = "numberish::required")]
    pub value: f64,
    /// Population the fraction is measured against (e.g. `endpoints`).
    pub basis: String,
}

/// Which side of the loss model a control reduces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlSurface {
    Frequency,
    Severity,
    Both,
}

impl ControlSurface {
    /// True when the control reduces event frequency.
    pub fn affects_frequency(&self) -> bool {
        matches!(self, ControlSurface::Frequency | ControlSurface::Both)
    }

    /// True when the control reduces loss severity.
    pub fn affects_severity(&self) -> bool {
        matches!(self, ControlSurface::Severity | ControlSurface::Both)
    }
}

/// Reference from a portfolio to a scenario document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRef {
    pub id: String,
    /// Scenario document path, resolved against the portfolio's directory.
    pub path: String,
    /// Scenario weight under mixture/choose-one semantics.
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub binding: Binding,
}

/// Asset binding for a scenario reference.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Asset names the scenario applies to; `None` means all assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to_assets: Option<Vec<String>>,
}

/// Portfolio aggregation semantics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Semantics {
    /// Aggregation method name; parsed by the planner so unknown methods
    /// surface as accumulated planning errors rather than parse failures.
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<serde_json::Value>,
}

/// How per-scenario annual losses combine into the portfolio loss.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    /// Scenarios are independent contributions; losses add.
    Sum,
    /// Exactly one scenario materialises per trial, weighted.
    Mixture,
    /// Alias of `mixture` with explicit-choice intent.
    ChooseOne,
    /// Worst single scenario per trial.
    Max,
}

impl AggregationMethod {
    /// Parses a semantics method name.
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "sum" => Some(Self::Sum),
            "mixture" => Some(Self::Mixture),
            "choose_one" => Some(Self::ChooseOne),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    /// True for the weighted categorical-pick semantics.
    pub fn is_weighted_pick(&self) -> bool {
        matches!(self, Self::Mixture | Self::ChooseOne)
    }
}

/// Optional dependency structure over portfolio state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copula: Option<CopulaSpec>,
}

/// Gaussian copula over ordered state references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopulaSpec {
    /// Copula family; only `gaussian` is supported.
    #[serde(rename = "type")]
    pub kind: String,
    /// Ordered `control:<id>:state` references; the matrix dimension.
    pub targets: Vec<String>,
    /// Generator name when no explicit matrix is given (`toeplitz`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    /// Toeplitz decay parameter (`rho^|i-j|`).
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub rho: Option<f64>,
    /// Explicit correlation matrix, row-major.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<f64>>>,
}

/// Declared relationship between assets (carried through, not simulated).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Relationship {
    /// Pairwise correlation declaration.
    Correlation {
        between: Vec<String>,
        value: f64,
    },
    /// Conditional dependency declaration.
    Conditional {
        source: String,
        target: String,
        probability: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_portfolio_json() -> &'static str {
        r#"{
            "version": "1.0",
            "meta": {"name": "ACME"},
            "portfolio": {
                "assets": [
                    {"name": "servers", "cardinality": 10, "tags": ["prod"]},
                    {"name": "laptops", "cardinality": "1 200"}
                ],
                "controls": [
                    {"id": "edr", "implementation_effectiveness": 0.7,
                     "coverage": {"value": "80%", "basis": "endpoints"},
                     "reliability": 0.99, "affects": "frequency"}
                ],
                "scenarios": [
                    {"id": "ransomware", "path": "scenarios/ransomware.json", "weight": 1.0,
                     "binding": {"applies_to_assets": ["servers"]}}
                ],
                "semantics": {"method": "sum"},
                "dependency": {
                    "copula": {"type": "gaussian", "targets": ["control:edr:state"],
                               "structure": "toeplitz", "rho": 0.5}
                }
            }
        }"#
    }

    #[test]
    fn test_portfolio_document_parse() {
        let doc: PortfolioDocument = serde_json::from_str(minimal_portfolio_json()).unwrap();
        let p = &doc.portfolio;
        assert_eq!(p.assets.len(), 2);
        assert_eq!(p.assets[1].cardinality, 1200);
        assert_eq!(p.controls[0].coverage.as_ref().unwrap().value, 0.8);
        assert_eq!(p.controls[0].affects, Some(ControlSurface::Frequency));
        assert_eq!(
            p.scenarios[0].binding.applies_to_assets.as_deref(),
            Some(&["servers".to_string()][..])
        );
        let copula = p.dependency.as_ref().unwrap().copula.as_ref().unwrap();
        assert_eq!(copula.kind, "gaussian");
        assert_eq!(copula.rho, Some(0.5));
    }

    #[test]
    fn test_binding_default_is_all_assets() {
        let json = r#"{"id": "s", "path": "s.json"}"#;
        let sref: ScenarioRef = serde_json::from_str(json).unwrap();
        assert!(sref.binding.applies_to_assets.is_none());
        assert!(sref.weight.is_none());
    }

    #[test]
    fn test_aggregation_method_parse() {
        assert_eq!(AggregationMethod::parse("sum"), Some(AggregationMethod::Sum));
        assert_eq!(
            AggregationMethod::parse("choose_one"),
            Some(AggregationMethod::ChooseOne)
        );
        assert_eq!(AggregationMethod::parse("median"), None);
        assert!(AggregationMethod::Mixture.is_weighted_pick());
        assert!(!AggregationMethod::Sum.is_weighted_pick());
    }

    #[test]
    fn test_control_surface_predicates() {
        assert!(ControlSurface::Both.affects_frequency());
        assert!(ControlSurface::Both.affects_severity());
        assert!(!ControlSurface::Severity.affects_frequency());
        assert!(!ControlSurface::Frequency.affects_severity());
    }
}
