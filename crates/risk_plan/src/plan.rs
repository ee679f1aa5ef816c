//! Execution plan types.
//!
//! The plan is the sole artifact the simulation engine needs: scenario
//! specs are embedded, bindings are concrete, and control effects are
//! pre-combined, so no further document access happens after planning.

use serde::{Deserialize, Serialize};

use risk_models::portfolio::{AggregationMethod, Asset, ControlSurface};
use risk_models::scenario::{FrequencySpec, SeveritySpec};

use crate::message::{MessageLevel, PlanMessage};

/// Resolved per-control effect for one scenario.
///
/// Carries the raw inventory/assessment inputs, the scenario-scoped
/// factors, and the three combined values the engine applies at run time.
/// Combined values are clamped to [0, 1]; missing factors default to the
/// multiplicative identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedScenarioControl {
    /// Canonical control id.
    pub id: String,

    // Inventory inputs (portfolio inventory or assessment pack)
    pub inventory_implementation_effectiveness: Option<f64>,
    pub inventory_coverage_value: Option<f64>,
    pub inventory_coverage_basis: Option<String>,
    pub inventory_reliability: Option<f64>,
    /// Effect surface; the engine defaults to frequency when absent.
    pub affects: Option<ControlSurface>,

    // Scenario-scoped factors
    pub scenario_effectiveness_factor: Option<f64>,
    pub scenario_coverage_factor: Option<f64>,
    pub scenario_coverage_basis: Option<String>,
    pub scenario_potency_factor: Option<f64>,

    // Combined values (what the engine applies)
    pub combined_implementation_effectiveness: Option<f64>,
    pub combined_coverage_value: Option<f64>,
    /// Always present; absent inventory reliability combines to 1.0.
    pub combined_reliability: f64,
}

/// A scenario bound into the portfolio, ready for simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedScenario {
    /// Scenario id from the portfolio.
    pub id: String,
    /// Scenario path as written in the portfolio.
    pub path: String,
    /// Resolved path the document was loaded from (reporting only).
    pub resolved_path: Option<String>,
    /// Scenario weight (mixture/choose-one semantics).
    pub weight: Option<f64>,
    /// Concrete asset names this scenario applies to.
    pub applies_to_assets: Vec<String>,
    /// Total exposure cardinality implied by the binding and basis.
    pub cardinality: u64,
    /// Scenario document name (reporting only).
    pub scenario_name: Option<String>,
    /// Embedded frequency assumptions.
    pub frequency: FrequencySpec,
    /// Embedded severity assumptions.
    pub severity: SeveritySpec,
    /// Resolved per-control effects applicable to this scenario.
    pub controls: Vec<ResolvedScenarioControl>,
}

/// Normalised Gaussian-copula dependency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopulaPlan {
    /// Control ids in target order; the matrix dimension.
    pub targets: Vec<String>,
    /// Validated correlation matrix, row-major.
    pub matrix: Vec<Vec<f64>>,
}

/// The fully resolved, document-independent description of a portfolio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub portfolio_name: Option<String>,
    pub semantics_method: AggregationMethod,
    pub assets: Vec<Asset>,
    pub scenarios: Vec<ResolvedScenario>,
    pub dependency: Option<CopulaPlan>,
}

/// Outcome of a planning pass.
///
/// `plan` is present exactly when `ok` is true, which requires zero
/// error-level messages; warnings never block plan production.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub ok: bool,
    pub errors: Vec<PlanMessage>,
    pub warnings: Vec<PlanMessage>,
    pub plan: Option<ExecutionPlan>,
}

impl PlanReport {
    /// Builds a report from accumulated messages, attaching the plan only
    /// when no errors were collected.
    pub fn from_messages(messages: Vec<PlanMessage>, plan: Option<ExecutionPlan>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = messages
            .into_iter()
            .partition(|m| m.level == MessageLevel::Error);
        let ok = errors.is_empty();
        Self {
            ok,
            errors,
            warnings,
            plan: if ok { plan } else { None },
        }
    }

    /// A failed report carrying a single error.
    pub fn failure(message: PlanMessage) -> Self {
        Self {
            ok: false,
            errors: vec![message],
            warnings: Vec::new(),
            plan: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_partitions_messages() {
        let report = PlanReport::from_messages(
            vec![
                PlanMessage::warning("a", "w1"),
                PlanMessage::error("b", "e1"),
                PlanMessage::warning("c", "w2"),
            ],
            None,
        );
        assert!(!report.ok);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.plan.is_none());
    }

    #[test]
    fn test_report_warnings_do_not_block() {
        let report =
            PlanReport::from_messages(vec![PlanMessage::warning("a", "heads up")], None);
        assert!(report.ok);
        assert_eq!(report.warnings.len(), 1);
    }
}
