//! Portfolio resolution.
//!
//! Turns a portfolio document plus its referenced scenario documents and
//! control packs into an [`ExecutionPlan`]. All problems accumulate; the
//! pass never stops at the first error.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use risk_models::packs::{ControlAssessment, ControlAssessmentDocument, ControlCatalogDocument};
use risk_models::portfolio::{AggregationMethod, Portfolio, PortfolioDocument};
use risk_models::scenario::{ControlRef, FrequencyBasis, ScenarioDocument};

use crate::message::PlanMessage;
use crate::plan::{
    CopulaPlan, ExecutionPlan, PlanReport, ResolvedScenario, ResolvedScenarioControl,
};
use crate::source::DocumentSource;

/// Bound assets expanding past this many exposure units get a
/// linear-scaling caveat.
const LARGE_CARDINALITY_THRESHOLD: u64 = 100_000;

/// Tolerance for unit diagonals, symmetry and weight sums.
const TOLERANCE: f64 = 1e-9;

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// True for a well-formed `control:<id>:state` reference.
fn is_control_state_ref(reference: &str) -> bool {
    control_id_from_state_ref(reference).is_some()
}

/// Extracts `<id>` from `control:<id>:state`.
fn control_id_from_state_ref(reference: &str) -> Option<&str> {
    let middle = reference.strip_prefix("control:")?.strip_suffix(":state")?;
    (!middle.is_empty()).then_some(middle)
}

/// Generates the Toeplitz correlation matrix `rho^|i-j|`.
fn toeplitz_corr(dim: usize, rho: f64) -> Vec<Vec<f64>> {
    (0..dim)
        .map(|i| {
            (0..dim)
                .map(|j| rho.powi((i as i32 - j as i32).abs()))
                .collect()
        })
        .collect()
}

/// Validates a correlation matrix; returns the first problem found.
fn validate_corr_matrix(matrix: &[Vec<f64>], dim: usize) -> Option<String> {
    if matrix.len() != dim {
        return Some(format!("matrix must have {dim} rows"));
    }
    for (i, row) in matrix.iter().enumerate() {
        if row.len() != dim {
            return Some(format!("matrix row {i} must have length {dim}"));
        }
        for (j, &v) in row.iter().enumerate() {
            if i == j && (v - 1.0).abs() > TOLERANCE {
                return Some("matrix diagonal entries must be 1.0".to_string());
            }
            if !(-1.0..=1.0).contains(&v) {
                return Some("matrix entries must be in [-1, 1]".to_string());
            }
        }
    }
    for i in 0..dim {
        for j in (i + 1)..dim {
            if (matrix[i][j] - matrix[j][i]).abs() > TOLERANCE {
                return Some("matrix must be symmetric".to_string());
            }
        }
    }
    None
}

/// Scenario control reference normalised to one internal record.
struct NormalizedControlRef<'a> {
    id: &'a str,
    effectiveness_factor: Option<f64>,
    coverage_factor: Option<(f64, &'a str)>,
    potency_factor: Option<f64>,
}

fn normalize_control_ref(reference: &ControlRef) -> NormalizedControlRef<'_> {
    match reference {
        ControlRef::Plain(id) => NormalizedControlRef {
            id: id.as_str(),
            effectiveness_factor: None,
            coverage_factor: None,
            potency_factor: None,
        },
        ControlRef::Detailed(detail) => NormalizedControlRef {
            id: detail.id.as_str(),
            effectiveness_factor: detail.effectiveness_factor,
            coverage_factor: detail
                .coverage_factor
                .as_ref()
                .map(|c| (c.value, c.basis.as_str())),
            potency_factor: detail.potency_factor,
        },
    }
}

/// Inventory values for one control after precedence resolution.
#[derive(Default)]
struct InventoryValues {
    effectiveness: Option<f64>,
    coverage_value: Option<f64>,
    coverage_basis: Option<String>,
    reliability: Option<f64>,
    affects: Option<risk_models::portfolio::ControlSurface>,
}

/// Resolves a portfolio document into an execution-friendly plan.
///
/// This is intentionally *not* a simulator. It resolves:
/// - portfolio asset bindings (`applies_to_assets` → concrete exposures)
/// - referenced scenario documents (embedded into the plan)
/// - referenced control packs (catalogs/assessments)
/// - scenario control refs → resolved, combined control effects
/// - the optional copula dependency → a validated correlation matrix
///
/// Identical inputs always yield identical output; planning draws no
/// randomness.
pub fn plan_portfolio(document: &PortfolioDocument, source: &dyn DocumentSource) -> PlanReport {
    let mut messages: Vec<PlanMessage> = Vec::new();
    let portfolio = &document.portfolio;

    debug!(
        portfolio = document.meta.name.as_deref().unwrap_or("(unnamed)"),
        scenarios = portfolio.scenarios.len(),
        "planning portfolio"
    );

    let assets_by_name: HashMap<&str, &risk_models::portfolio::Asset> = portfolio
        .assets
        .iter()
        .map(|a| (a.name.as_str(), a))
        .collect();

    for (idx, asset) in portfolio.assets.iter().enumerate() {
        if asset.cardinality < 1 {
            messages.push(PlanMessage::error(
                format!("portfolio.assets[{idx}].cardinality"),
                format!("Asset '{}' must have cardinality >= 1.", asset.name),
            ));
        }
    }

    // --- Load packs (optional) ---
    let (catalog_ids, assessment_by_id) = load_packs(portfolio, source, &mut messages);

    // --- Portfolio inventory (highest precedence) ---
    let mut portfolio_controls_by_id: HashMap<&str, &risk_models::portfolio::PortfolioControl> =
        HashMap::new();
    for (idx, control) in portfolio.controls.iter().enumerate() {
        portfolio_controls_by_id.insert(control.id.as_str(), control);
        if !catalog_ids.is_empty() && !catalog_ids.contains(control.id.as_str()) {
            messages.push(PlanMessage::error(
                format!("portfolio.controls[{idx}].id"),
                format!(
                    "Unknown control id '{}' (not present in referenced catalog pack(s)).",
                    control.id
                ),
            ));
        }
    }

    // --- Semantics ---
    let semantics_method = match AggregationMethod::parse(&portfolio.semantics.method) {
        Some(method) => method,
        None => {
            messages.push(PlanMessage::error(
                "portfolio.semantics.method",
                format!(
                    "Unsupported portfolio semantics method '{}'.",
                    portfolio.semantics.method
                ),
            ));
            // Placeholder; errors suppress the plan anyway.
            AggregationMethod::Sum
        }
    };
    if semantics_method.is_weighted_pick() {
        validate_scenario_weights(portfolio, &mut messages);
    }

    // --- Dependency normalisation (optional) ---
    let dependency_plan = portfolio
        .dependency
        .as_ref()
        .and_then(|d| d.copula.as_ref())
        .and_then(|copula| {
            resolve_copula(
                copula,
                &portfolio_controls_by_id,
                &assessment_by_id,
                &mut messages,
            )
        });

    // --- Scenario resolution ---
    let mut resolved_scenarios: Vec<ResolvedScenario> = Vec::new();
    for (idx, sref) in portfolio.scenarios.iter().enumerate() {
        let scenario_doc = match load_scenario(sref, idx, source, &mut messages) {
            Some(doc) => doc,
            None => continue,
        };

        let binding = sref.binding.applies_to_assets.as_ref();
        let applies_to: Vec<String> = match binding {
            None => portfolio.assets.iter().map(|a| a.name.clone()).collect(),
            Some(names) => names.clone(),
        };

        let basis = scenario_doc.scenario.frequency.basis;
        if basis == FrequencyBasis::PerOrganizationPerYear && binding.is_some() {
            messages.push(PlanMessage::warning(
                format!("portfolio.scenarios[{idx}].binding.applies_to_assets"),
                "Scenario frequency basis is 'per_organization_per_year'; asset binding does not \
                 affect cardinality (cardinality stays 1). If you intended per-asset scaling, \
                 consider 'per_asset_unit_per_year'.",
            ));
        }

        let unknown: Vec<&str> = applies_to
            .iter()
            .map(String::as_str)
            .filter(|name| !assets_by_name.contains_key(name))
            .collect();
        if !unknown.is_empty() {
            messages.push(PlanMessage::error(
                format!("portfolio.scenarios[{idx}].binding.applies_to_assets"),
                format!("Unknown asset(s) referenced: {unknown:?}"),
            ));
            continue;
        }

        let cardinality = match resolve_cardinality(
            basis,
            &applies_to,
            &assets_by_name,
            idx,
            &mut messages,
        ) {
            Some(c) => c,
            None => continue,
        };

        let controls = resolve_scenario_controls(
            &scenario_doc,
            idx,
            &portfolio_controls_by_id,
            &assessment_by_id,
            &mut messages,
        );

        resolved_scenarios.push(ResolvedScenario {
            id: sref.id.clone(),
            path: sref.path.clone(),
            resolved_path: Some(source.resolve(&sref.path)),
            weight: sref.weight,
            applies_to_assets: applies_to,
            cardinality,
            scenario_name: scenario_doc.meta.name.clone(),
            frequency: scenario_doc.scenario.frequency.clone(),
            severity: scenario_doc.scenario.severity.clone(),
            controls,
        });
    }

    let plan = ExecutionPlan {
        portfolio_name: document.meta.name.clone(),
        semantics_method,
        assets: portfolio.assets.clone(),
        scenarios: resolved_scenarios,
        dependency: dependency_plan,
    };

    PlanReport::from_messages(messages, Some(plan))
}

fn load_packs(
    portfolio: &Portfolio,
    source: &dyn DocumentSource,
    messages: &mut Vec<PlanMessage>,
) -> (BTreeSet<String>, HashMap<String, ControlAssessment>) {
    let mut catalog_ids: BTreeSet<String> = BTreeSet::new();
    for (idx, path) in portfolio.control_catalogs.iter().enumerate() {
        let doc_path = format!("portfolio.control_catalogs[{idx}]");
        let text = match source.read(path) {
            Ok(text) => text,
            Err(err) => {
                messages.push(PlanMessage::error(doc_path, err.to_string()));
                continue;
            }
        };
        match serde_json::from_str::<ControlCatalogDocument>(&text) {
            Ok(doc) => {
                catalog_ids.extend(doc.catalog.controls.into_iter().map(|entry| entry.id));
            }
            Err(err) => {
                messages.push(PlanMessage::error(
                    doc_path,
                    format!("Invalid control catalog pack: {err}"),
                ));
            }
        }
    }

    let mut assessment_by_id: HashMap<String, ControlAssessment> = HashMap::new();
    for (idx, path) in portfolio.control_assessments.iter().enumerate() {
        let doc_path = format!("portfolio.control_assessments[{idx}]");
        let text = match source.read(path) {
            Ok(text) => text,
            Err(err) => {
                messages.push(PlanMessage::error(doc_path, err.to_string()));
                continue;
            }
        };
        match serde_json::from_str::<ControlAssessmentDocument>(&text) {
            Ok(doc) => {
                for assessment in doc.assessment.assessments {
                    if assessment_by_id.contains_key(&assessment.id) {
                        messages.push(PlanMessage::warning(
                            doc_path.clone(),
                            format!(
                                "Duplicate assessment for control id '{}' across packs; \
                                 last one wins.",
                                assessment.id
                            ),
                        ));
                    }
                    assessment_by_id.insert(assessment.id.clone(), assessment);
                }
            }
            Err(err) => {
                messages.push(PlanMessage::error(
                    doc_path,
                    format!("Invalid control assessment pack: {err}"),
                ));
            }
        }
    }

    (catalog_ids, assessment_by_id)
}

/// Mixture/choose-one semantics require a full, normalised weight vector.
fn validate_scenario_weights(portfolio: &Portfolio, messages: &mut Vec<PlanMessage>) {
    let mut sum = 0.0;
    let mut all_present = true;
    for (idx, sref) in portfolio.scenarios.iter().enumerate() {
        match sref.weight {
            Some(w) => sum += w,
            None => {
                all_present = false;
                messages.push(PlanMessage::error(
                    format!("portfolio.scenarios[{idx}].weight"),
                    format!(
                        "Semantics method '{}' requires a weight on every scenario.",
                        portfolio.semantics.method
                    ),
                ));
            }
        }
    }
    if all_present && !portfolio.scenarios.is_empty() && (sum - 1.0).abs() > TOLERANCE {
        messages.push(PlanMessage::error(
            "portfolio.scenarios",
            format!("Scenario weights must sum to 1.0, got {sum}."),
        ));
    }
}

fn resolve_copula(
    copula: &risk_models::portfolio::CopulaSpec,
    portfolio_controls_by_id: &HashMap<&str, &risk_models::portfolio::PortfolioControl>,
    assessment_by_id: &HashMap<String, ControlAssessment>,
    messages: &mut Vec<PlanMessage>,
) -> Option<CopulaPlan> {
    if copula.kind != "gaussian" {
        messages.push(PlanMessage::error(
            "portfolio.dependency.copula.type",
            format!("Unsupported copula type '{}'.", copula.kind),
        ));
        return None;
    }

    let dim = copula.targets.len();
    let bad_targets: Vec<&str> = copula
        .targets
        .iter()
        .map(String::as_str)
        .filter(|t| !is_control_state_ref(t))
        .collect();
    if !bad_targets.is_empty() {
        messages.push(PlanMessage::error(
            "portfolio.dependency.copula.targets",
            format!(
                "Unsupported target reference(s): {bad_targets:?}. Supported: control:<id>:state"
            ),
        ));
        return None;
    }

    let target_ids: Vec<String> = copula
        .targets
        .iter()
        .filter_map(|t| control_id_from_state_ref(t))
        .map(str::to_string)
        .collect();
    for id in &target_ids {
        if !portfolio_controls_by_id.contains_key(id.as_str())
            && !assessment_by_id.contains_key(id)
        {
            messages.push(PlanMessage::error(
                "portfolio.dependency.copula.targets",
                format!(
                    "Copula target control id '{id}' not found in portfolio.controls or \
                     control assessments."
                ),
            ));
        }
    }

    let matrix: Option<Vec<Vec<f64>>> = if let Some(matrix) = &copula.matrix {
        Some(matrix.clone())
    } else {
        if !matches!(copula.structure.as_deref(), None | Some("toeplitz")) {
            messages.push(PlanMessage::error(
                "portfolio.dependency.copula.structure",
                format!(
                    "Unsupported copula structure '{}'.",
                    copula.structure.as_deref().unwrap_or_default()
                ),
            ));
        }
        match copula.rho {
            Some(rho) => Some(toeplitz_corr(dim, rho)),
            None => {
                messages.push(PlanMessage::error(
                    "portfolio.dependency.copula.rho",
                    "Toeplitz copula requires 'rho' when 'matrix' is not provided.",
                ));
                None
            }
        }
    };

    let matrix = matrix?;
    if let Some(problem) = validate_corr_matrix(&matrix, dim) {
        messages.push(PlanMessage::error("portfolio.dependency.copula", problem));
        return None;
    }

    Some(CopulaPlan {
        targets: target_ids,
        matrix,
    })
}

fn load_scenario(
    sref: &risk_models::portfolio::ScenarioRef,
    idx: usize,
    source: &dyn DocumentSource,
    messages: &mut Vec<PlanMessage>,
) -> Option<ScenarioDocument> {
    let doc_path = format!("portfolio.scenarios[{idx}].path");
    let text = match source.read(&sref.path) {
        Ok(text) => text,
        Err(err) => {
            messages.push(PlanMessage::error(doc_path, err.to_string()));
            return None;
        }
    };
    match serde_json::from_str::<ScenarioDocument>(&text) {
        Ok(doc) => Some(doc),
        Err(err) => {
            messages.push(PlanMessage::error(
                doc_path,
                format!("Invalid scenario document: {err}"),
            ));
            None
        }
    }
}

fn resolve_cardinality(
    basis: FrequencyBasis,
    applies_to: &[String],
    assets_by_name: &HashMap<&str, &risk_models::portfolio::Asset>,
    idx: usize,
    messages: &mut Vec<PlanMessage>,
) -> Option<u64> {
    if basis != FrequencyBasis::PerAssetUnitPerYear {
        return Some(1);
    }

    if applies_to.is_empty() {
        messages.push(PlanMessage::error(
            format!("portfolio.scenarios[{idx}].binding.applies_to_assets"),
            "Scenario uses per_asset_unit_per_year but no assets are bound \
             (empty applies_to_assets).",
        ));
        return None;
    }

    let bound: Vec<&risk_models::portfolio::Asset> = applies_to
        .iter()
        .filter_map(|name| assets_by_name.get(name.as_str()).copied())
        .collect();
    let cardinality: u64 = bound.iter().map(|a| a.cardinality).sum();

    if cardinality >= LARGE_CARDINALITY_THRESHOLD {
        messages.push(PlanMessage::warning(
            format!("portfolio.scenarios[{idx}]"),
            format!(
                "Scenario expands to total cardinality={cardinality} (per-asset-unit basis). \
                 Linear scaling (cardinality × lambda) can be sensitive to \
                 correlation/shared-failure modes at large scales; treat results as an \
                 approximation."
            ),
        ));
    }

    // Exchangeability check: summed-cardinality scaling assumes comparable
    // exposure units.
    let distinct_tag_sets: BTreeSet<Vec<String>> = bound
        .iter()
        .filter_map(|a| a.tags.as_ref())
        .map(|tags| {
            let set: BTreeSet<&str> = tags.iter().map(String::as_str).collect();
            set.into_iter().map(str::to_string).collect()
        })
        .collect();
    let distinct_crit_kinds: BTreeSet<&str> = bound
        .iter()
        .filter_map(|a| a.criticality_index.as_ref())
        .map(|c| c.kind.as_str())
        .collect();

    if distinct_tag_sets.len() > 1 || distinct_crit_kinds.len() > 1 {
        messages.push(PlanMessage::warning(
            format!("portfolio.scenarios[{idx}].binding.applies_to_assets"),
            "Bound assets appear heterogeneous (different tags and/or \
             criticality_index.type). Summed-cardinality scaling assumes \
             comparable/exchangeable exposure units; consider splitting scenarios or \
             modeling heterogeneity explicitly.",
        ));
    }

    Some(cardinality)
}

fn lookup_inventory(
    id: &str,
    portfolio_controls_by_id: &HashMap<&str, &risk_models::portfolio::PortfolioControl>,
    assessment_by_id: &HashMap<String, ControlAssessment>,
) -> InventoryValues {
    if let Some(inv) = portfolio_controls_by_id.get(id) {
        return InventoryValues {
            effectiveness: inv.implementation_effectiveness,
            coverage_value: inv.coverage.as_ref().map(|c| c.value),
            coverage_basis: inv.coverage.as_ref().map(|c| c.basis.clone()),
            reliability: inv.reliability,
            affects: inv.affects,
        };
    }
    if let Some(assessment) = assessment_by_id.get(id) {
        return InventoryValues {
            effectiveness: assessment.implementation_effectiveness,
            coverage_value: assessment.coverage.as_ref().map(|c| c.value),
            coverage_basis: assessment.coverage.as_ref().map(|c| c.basis.clone()),
            reliability: assessment.reliability,
            affects: assessment.affects,
        };
    }
    InventoryValues::default()
}

fn resolve_scenario_controls(
    scenario_doc: &ScenarioDocument,
    idx: usize,
    portfolio_controls_by_id: &HashMap<&str, &risk_models::portfolio::PortfolioControl>,
    assessment_by_id: &HashMap<String, ControlAssessment>,
    messages: &mut Vec<PlanMessage>,
) -> Vec<ResolvedScenarioControl> {
    let mut resolved = Vec::new();

    for reference in &scenario_doc.scenario.controls {
        let normalized = normalize_control_ref(reference);
        let inventory =
            lookup_inventory(normalized.id, portfolio_controls_by_id, assessment_by_id);

        if inventory.effectiveness.is_none() && inventory.coverage_value.is_none() {
            messages.push(PlanMessage::error(
                format!("portfolio.scenarios[{idx}].path"),
                format!(
                    "Scenario references control id '{}' but no inventory/assessment data \
                     is available for it.",
                    normalized.id
                ),
            ));
            continue;
        }

        // Scenario values are *multiplicative applicability factors*.
        let combined_effectiveness = inventory.effectiveness.map(|eff| {
            clamp01(
                eff * normalized.effectiveness_factor.unwrap_or(1.0)
                    * normalized.potency_factor.unwrap_or(1.0),
            )
        });
        let combined_coverage = inventory.coverage_value.map(|cov| {
            clamp01(cov * normalized.coverage_factor.map(|(v, _)| v).unwrap_or(1.0))
        });
        let combined_reliability = clamp01(inventory.reliability.unwrap_or(1.0));

        if let (Some(inv_basis), Some((_, scenario_basis))) =
            (&inventory.coverage_basis, normalized.coverage_factor)
        {
            if inv_basis != scenario_basis {
                messages.push(PlanMessage::warning(
                    format!("portfolio.scenarios[{idx}].path"),
                    format!(
                        "Control '{}' combines coverage with different bases: \
                         inventory='{inv_basis}', scenario='{scenario_basis}'. \
                         Treating scenario coverage as a pure factor.",
                        normalized.id
                    ),
                ));
            }
        }

        resolved.push(ResolvedScenarioControl {
            id: normalized.id.to_string(),
            inventory_implementation_effectiveness: inventory.effectiveness,
            inventory_coverage_value: inventory.coverage_value,
            inventory_coverage_basis: inventory.coverage_basis,
            inventory_reliability: inventory.reliability,
            affects: inventory.affects,
            scenario_effectiveness_factor: normalized.effectiveness_factor,
            scenario_coverage_factor: normalized.coverage_factor.map(|(v, _)| v),
            scenario_coverage_basis: normalized.coverage_factor.map(|(_, b)| b.to_string()),
            scenario_potency_factor: normalized.potency_factor,
            combined_implementation_effectiveness: combined_effectiveness,
            combined_coverage_value: combined_coverage,
            combined_reliability,
        });
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_state_ref_parsing() {
        assert!(is_control_state_ref("control:edr:state"));
        assert!(!is_control_state_ref("control::state"));
        assert!(!is_control_state_ref("asset:edr:state"));
        assert!(!is_control_state_ref("control:edr"));
        assert_eq!(control_id_from_state_ref("control:mfa:state"), Some("mfa"));
    }

    #[test]
    fn test_toeplitz_corr() {
        let m = toeplitz_corr(3, 0.5);
        assert_eq!(m[0][0], 1.0);
        assert_eq!(m[0][1], 0.5);
        assert_eq!(m[0][2], 0.25);
        assert_eq!(m[2][0], 0.25);
        assert_eq!(m[1][2], 0.5);
    }

    #[test]
    fn test_validate_corr_matrix_accepts_valid() {
        let m = vec![vec![1.0, 0.7], vec![0.7, 1.0]];
        assert_eq!(validate_corr_matrix(&m, 2), None);
    }

    #[test]
    fn test_validate_corr_matrix_rejects_bad_diagonal() {
        let m = vec![vec![0.9, 0.7], vec![0.7, 1.0]];
        assert!(validate_corr_matrix(&m, 2).unwrap().contains("diagonal"));
    }

    #[test]
    fn test_validate_corr_matrix_rejects_asymmetry() {
        let m = vec![vec![1.0, 0.7], vec![0.3, 1.0]];
        assert!(validate_corr_matrix(&m, 2).unwrap().contains("symmetric"));
    }

    #[test]
    fn test_validate_corr_matrix_rejects_out_of_range() {
        let m = vec![vec![1.0, 1.5], vec![1.5, 1.0]];
        assert!(validate_corr_matrix(&m, 2).unwrap().contains("[-1, 1]"));
    }

    #[test]
    fn test_validate_corr_matrix_rejects_wrong_dims() {
        let m = vec![vec![1.0, 0.5]];
        assert!(validate_corr_matrix(&m, 2).unwrap().contains("rows"));
    }

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.2), 0.0);
        assert_eq!(clamp01(0.4), 0.4);
        assert_eq!(clamp01(1.7), 1.0);
    }
}
