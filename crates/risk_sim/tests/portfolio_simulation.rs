//! End-to-end portfolio runs: plan with the real planner, simulate with
//! the real engine, check the analytic anchors.

use risk_models::portfolio::PortfolioDocument;
use risk_plan::{plan_portfolio, ExecutionPlan, MemoryDocumentSource};
use risk_sim::{run_portfolio_simulation, PortfolioRunConfig};

const N_TRIALS: usize = 10_000;
const SEED: u64 = 42;

fn poisson_lognormal_scenario(basis: &str, lambda: f64, median: f64, sigma: f64) -> String {
    format!(
        r#"{{
            "version": "1.0",
            "meta": {{"name": "scenario"}},
            "scenario": {{
                "frequency": {{"basis": "{basis}", "model": "poisson",
                              "parameters": {{"lambda": {lambda}}}}},
                "severity": {{"model": "lognormal",
                             "parameters": {{"median": {median}, "sigma": {sigma}}}}}
            }}
        }}"#
    )
}

fn plan_from(portfolio_json: &str, source: &MemoryDocumentSource) -> ExecutionPlan {
    let doc: PortfolioDocument = serde_json::from_str(portfolio_json).unwrap();
    let report = plan_portfolio(&doc, source);
    assert!(report.ok, "planning failed: {:?}", report.errors);
    report.plan.unwrap()
}

fn run(plan: &ExecutionPlan) -> risk_sim::SimulationResult {
    run_portfolio_simulation(plan, &PortfolioRunConfig::new(N_TRIALS, Some(SEED)))
}

#[test]
fn example_a_single_scenario_eal() {
    // Poisson(2.0) x Lognormal(median=1000, sigma=0.5):
    // EAL = 2.0 * 1000 * exp(0.125) ~= 2266.
    let mut source = MemoryDocumentSource::new();
    source.insert(
        "s.json",
        poisson_lognormal_scenario("per_organization_per_year", 2.0, 1000.0, 0.5),
    );
    let plan = plan_from(
        r#"{
            "version": "1.0",
            "meta": {"name": "Example A"},
            "portfolio": {
                "assets": [{"name": "org", "cardinality": 1}],
                "scenarios": [{"id": "s", "path": "s.json"}],
                "semantics": {"method": "sum"}
            }
        }"#,
        &source,
    );

    let result = run(&plan);
    assert!(result.success, "errors: {:?}", result.errors);
    let eal = result.metrics.unwrap().eal;
    let expected = 2.0 * 1000.0 * (0.125_f64).exp();
    assert!(
        (eal - expected).abs() / expected < 0.05,
        "EAL {eal} not within 5% of {expected}"
    );
}

#[test]
fn example_b_cardinality_scales_eal() {
    // Same scenario bound to two assets (10 + 5 units) under the
    // per-asset basis: cardinality 15, EAL ~= 15 * 1133 ~= 16995.
    let mut source = MemoryDocumentSource::new();
    source.insert(
        "s.json",
        poisson_lognormal_scenario("per_asset_unit_per_year", 2.0, 1000.0, 0.5),
    );
    let plan = plan_from(
        r#"{
            "version": "1.0",
            "meta": {"name": "Example B"},
            "portfolio": {
                "assets": [
                    {"name": "servers", "cardinality": 10},
                    {"name": "laptops", "cardinality": 5}
                ],
                "scenarios": [{"id": "s", "path": "s.json"}],
                "semantics": {"method": "sum"}
            }
        }"#,
        &source,
    );

    assert_eq!(plan.scenarios[0].cardinality, 15);

    let result = run(&plan);
    assert!(result.success);
    let eal = result.metrics.unwrap().eal;
    let expected = 15.0 * 2.0 * 1000.0 * (0.125_f64).exp();
    assert!(
        (eal - expected).abs() / expected < 0.05,
        "EAL {eal} not within 5% of {expected}"
    );
}

#[test]
fn multi_scenario_sum_adds_expected_losses() {
    // Scenario 1: EAL ~= 2.0 * 1133 = 2266; scenario 2: 5.0 * 100.5 = 502.5.
    let mut source = MemoryDocumentSource::new();
    source.insert(
        "db.json",
        poisson_lognormal_scenario("per_organization_per_year", 2.0, 1000.0, 0.5),
    );
    source.insert(
        "laptop.json",
        poisson_lognormal_scenario("per_organization_per_year", 5.0, 100.0, 0.1),
    );
    let plan = plan_from(
        r#"{
            "version": "1.0",
            "portfolio": {
                "assets": [{"name": "org", "cardinality": 1}],
                "scenarios": [
                    {"id": "db", "path": "db.json"},
                    {"id": "laptop", "path": "laptop.json"}
                ],
                "semantics": {"method": "sum"}
            }
        }"#,
        &source,
    );

    let result = run(&plan);
    assert!(result.success);
    let eal = result.metrics.unwrap().eal;
    let expected = 2.0 * 1000.0 * (0.125_f64).exp() + 5.0 * 100.0 * (0.005_f64).exp();
    assert!(
        (eal - expected).abs() / expected < 0.05,
        "EAL {eal} not within 5% of {expected}"
    );
}

#[test]
fn fixed_seed_gives_bit_identical_runs() {
    let mut source = MemoryDocumentSource::new();
    source.insert(
        "s.json",
        poisson_lognormal_scenario("per_organization_per_year", 2.0, 1000.0, 0.5),
    );
    let plan = plan_from(
        r#"{
            "version": "1.0",
            "portfolio": {
                "assets": [{"name": "org", "cardinality": 1}],
                "scenarios": [{"id": "s", "path": "s.json"}],
                "semantics": {"method": "sum"}
            }
        }"#,
        &source,
    );

    let a = run(&plan);
    let b = run(&plan);
    assert_eq!(a.metrics, b.metrics);
    assert_eq!(
        a.distribution.as_ref().unwrap().raw_data,
        b.distribution.as_ref().unwrap().raw_data
    );
}

fn portfolio_with_control(effectiveness: f64, coverage: f64, reliability: f64) -> String {
    format!(
        r#"{{
            "version": "1.0",
            "portfolio": {{
                "assets": [{{"name": "org", "cardinality": 1}}],
                "controls": [
                    {{"id": "edr", "implementation_effectiveness": {effectiveness},
                     "coverage": {{"value": {coverage}, "basis": "endpoints"}},
                     "reliability": {reliability}, "affects": "frequency"}}
                ],
                "scenarios": [{{"id": "s", "path": "s.json"}}],
                "semantics": {{"method": "sum"}}
            }}
        }}"#
    )
}

fn controlled_scenario() -> String {
    r#"{
        "version": "1.0",
        "scenario": {
            "frequency": {"basis": "per_organization_per_year", "model": "poisson",
                          "parameters": {"lambda": 2.0}},
            "severity": {"model": "lognormal",
                         "parameters": {"median": 1000, "sigma": 0.5}},
            "controls": ["edr"]
        }
    }"#
    .to_string()
}

#[test]
fn zero_effect_control_leaves_losses_unchanged() {
    let mut source = MemoryDocumentSource::new();
    source.insert("s.json", controlled_scenario());

    // Baseline without any controls on the scenario.
    source.insert(
        "plain.json",
        poisson_lognormal_scenario("per_organization_per_year", 2.0, 1000.0, 0.5),
    );
    let baseline = plan_from(
        r#"{
            "version": "1.0",
            "portfolio": {
                "assets": [{"name": "org", "cardinality": 1}],
                "scenarios": [{"id": "s", "path": "plain.json"}],
                "semantics": {"method": "sum"}
            }
        }"#,
        &source,
    );

    // effectiveness = 0 -> reduction 0 -> multiplier stays 1.0.
    let zero_eff = plan_from(&portfolio_with_control(0.0, 1.0, 1.0), &source);
    // coverage = 0 behaves identically.
    let zero_cov = plan_from(&portfolio_with_control(0.8, 0.0, 1.0), &source);

    let base = run(&baseline);
    let with_zero_eff = run(&zero_eff);
    let with_zero_cov = run(&zero_cov);

    assert_eq!(base.metrics, with_zero_eff.metrics);
    assert_eq!(base.metrics, with_zero_cov.metrics);
}

#[test]
fn effective_control_thins_frequency() {
    let mut source = MemoryDocumentSource::new();
    source.insert("s.json", controlled_scenario());
    source.insert(
        "plain.json",
        poisson_lognormal_scenario("per_organization_per_year", 2.0, 1000.0, 0.5),
    );

    let baseline = plan_from(
        r#"{
            "version": "1.0",
            "portfolio": {
                "assets": [{"name": "org", "cardinality": 1}],
                "scenarios": [{"id": "s", "path": "plain.json"}],
                "semantics": {"method": "sum"}
            }
        }"#,
        &source,
    );
    // reduction = 0.5 * 1.0 * 1 -> frequency multiplier 0.5.
    let controlled = plan_from(&portfolio_with_control(0.5, 1.0, 1.0), &source);

    let base_eal = run(&baseline).metrics.unwrap().eal;
    let controlled_eal = run(&controlled).metrics.unwrap().eal;

    let ratio = controlled_eal / base_eal;
    assert!(
        (ratio - 0.5).abs() < 0.07,
        "controlled/base EAL ratio {ratio} not near 0.5"
    );
}

#[test]
fn unreliable_control_never_reduces() {
    let mut source = MemoryDocumentSource::new();
    source.insert("s.json", controlled_scenario());

    // reliability = 0: the control is down on every trial, so a fully
    // effective control changes nothing.
    let down = plan_from(&portfolio_with_control(1.0, 1.0, 0.0), &source);
    let result = run(&down);
    assert!(result.success);
    let eal = result.metrics.unwrap().eal;
    let expected = 2.0 * 1000.0 * (0.125_f64).exp();
    assert!(
        (eal - expected).abs() / expected < 0.05,
        "EAL {eal} should match the uncontrolled expectation {expected}"
    );
}

#[test]
fn fully_reliable_total_control_eliminates_losses() {
    let mut source = MemoryDocumentSource::new();
    source.insert("s.json", controlled_scenario());

    let total = plan_from(&portfolio_with_control(1.0, 1.0, 1.0), &source);
    let result = run(&total);
    assert!(result.success);
    assert_eq!(result.metrics.unwrap().eal, 0.0);
}

#[test]
fn mixture_portfolio_tracks_weighted_scenarios() {
    let mut source = MemoryDocumentSource::new();
    source.insert(
        "small.json",
        poisson_lognormal_scenario("per_organization_per_year", 2.0, 100.0, 0.3),
    );
    source.insert(
        "large.json",
        poisson_lognormal_scenario("per_organization_per_year", 2.0, 10000.0, 0.3),
    );
    let plan = plan_from(
        r#"{
            "version": "1.0",
            "portfolio": {
                "assets": [{"name": "org", "cardinality": 1}],
                "scenarios": [
                    {"id": "small", "path": "small.json", "weight": 0.5},
                    {"id": "large", "path": "large.json", "weight": 0.5}
                ],
                "semantics": {"method": "mixture"}
            }
        }"#,
        &source,
    );

    let result = run(&plan);
    assert!(result.success);
    let eal = result.metrics.unwrap().eal;

    let small_eal = 2.0 * 100.0 * (0.045_f64).exp();
    let large_eal = 2.0 * 10_000.0 * (0.045_f64).exp();
    let expected = 0.5 * small_eal + 0.5 * large_eal;
    assert!(
        (eal - expected).abs() / expected < 0.10,
        "mixture EAL {eal} not near weighted expectation {expected}"
    );
}

#[test]
fn max_semantics_bounded_by_sum() {
    let mut source = MemoryDocumentSource::new();
    source.insert(
        "a.json",
        poisson_lognormal_scenario("per_organization_per_year", 2.0, 1000.0, 0.5),
    );
    source.insert(
        "b.json",
        poisson_lognormal_scenario("per_organization_per_year", 3.0, 500.0, 0.4),
    );

    let body = |method: &str| {
        format!(
            r#"{{
                "version": "1.0",
                "portfolio": {{
                    "assets": [{{"name": "org", "cardinality": 1}}],
                    "scenarios": [
                        {{"id": "a", "path": "a.json"}},
                        {{"id": "b", "path": "b.json"}}
                    ],
                    "semantics": {{"method": "{method}"}}
                }}
            }}"#
        )
    };

    let max_eal = run(&plan_from(&body("max"), &source)).metrics.unwrap().eal;
    let sum_eal = run(&plan_from(&body("sum"), &source)).metrics.unwrap().eal;
    assert!(max_eal <= sum_eal);
    assert!(max_eal > 0.0);
}

#[test]
fn scenario_failure_fails_the_whole_portfolio() {
    let mut source = MemoryDocumentSource::new();
    source.insert(
        "good.json",
        poisson_lognormal_scenario("per_organization_per_year", 2.0, 1000.0, 0.5),
    );
    // sigma missing: planner passes (structure is valid), engine rejects.
    source.insert(
        "bad.json",
        r#"{
            "version": "1.0",
            "scenario": {
                "frequency": {"basis": "per_organization_per_year", "model": "poisson",
                              "parameters": {"lambda": 1.0}},
                "severity": {"model": "lognormal", "parameters": {"median": 1000}}
            }
        }"#,
    );
    let plan = plan_from(
        r#"{
            "version": "1.0",
            "portfolio": {
                "assets": [{"name": "org", "cardinality": 1}],
                "scenarios": [
                    {"id": "good", "path": "good.json"},
                    {"id": "bad", "path": "bad.json"}
                ],
                "semantics": {"method": "sum"}
            }
        }"#,
        &source,
    );

    let result = run(&plan);
    assert!(!result.success);
    assert!(result.errors.iter().any(|e| e.contains("bad")));
    assert!(result.metrics.is_none());
}

#[test]
fn copula_coupled_controls_still_respect_reliability() {
    let mut source = MemoryDocumentSource::new();
    source.insert(
        "s.json",
        r#"{
            "version": "1.0",
            "scenario": {
                "frequency": {"basis": "per_organization_per_year", "model": "poisson",
                              "parameters": {"lambda": 2.0}},
                "severity": {"model": "lognormal",
                             "parameters": {"median": 1000, "sigma": 0.5}},
                "controls": ["edr", "backup"]
            }
        }"#,
    );
    let plan = plan_from(
        r#"{
            "version": "1.0",
            "portfolio": {
                "assets": [{"name": "org", "cardinality": 1}],
                "controls": [
                    {"id": "edr", "implementation_effectiveness": 0.5,
                     "coverage": {"value": 1.0, "basis": "endpoints"},
                     "reliability": 0.9, "affects": "frequency"},
                    {"id": "backup", "implementation_effectiveness": 0.5,
                     "coverage": {"value": 1.0, "basis": "endpoints"},
                     "reliability": 0.9, "affects": "severity"}
                ],
                "scenarios": [{"id": "s", "path": "s.json"}],
                "semantics": {"method": "sum"},
                "dependency": {"copula": {"type": "gaussian",
                    "targets": ["control:edr:state", "control:backup:state"],
                    "structure": "toeplitz", "rho": 0.8}}
            }
        }"#,
        &source,
    );

    let result = run(&plan);
    assert!(result.success, "errors: {:?}", result.errors);
    let eal = result.metrics.unwrap().eal;
    let uncontrolled = 2.0 * 1000.0 * (0.125_f64).exp();
    // Both controls are up ~90% of trials; the joint reduction keeps EAL
    // well below the uncontrolled expectation but above the fully
    // controlled floor of 25%.
    assert!(eal < uncontrolled * 0.75, "EAL {eal} too high");
    assert!(eal > uncontrolled * 0.20, "EAL {eal} too low");
}

#[test]
fn empty_portfolio_plan_fails_cleanly() {
    let plan = ExecutionPlan {
        portfolio_name: None,
        semantics_method: risk_models::portfolio::AggregationMethod::Sum,
        assets: Vec::new(),
        scenarios: Vec::new(),
        dependency: None,
    };
    let result = run_portfolio_simulation(&plan, &PortfolioRunConfig::new(100, Some(1)));
    assert!(!result.success);
    assert!(result.errors[0].contains("no scenarios"));
}
