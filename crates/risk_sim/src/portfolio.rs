//! Portfolio orchestration: control-state sampling, per-scenario runs and
//! aggregation.
//!
//! The seed fans out deterministically: the control-state draw (including
//! the copula) uses the base seed, scenario `i` uses
//! `base_seed + i * 1000`, and the mixture pick re-seeds from the base.
//! Scenario runs are embarrassingly parallel (each owns its arrays and
//! its derived seed) and merge by scenario index, so results are
//! identical with or without rayon's thread pool.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use risk_core::fx::FxConfig;
use risk_models::portfolio::{AggregationMethod, ControlSurface};
use risk_plan::{ExecutionPlan, ResolvedScenario};

use crate::copula::{gaussian_copula_uniforms, CorrelationMatrix};
use crate::engine::run_scenario;
use crate::error::SimError;
use crate::frequency::RateMultiplier;
use crate::result::{
    compute_distribution, compute_metrics, Metadata, SimulationResult, DEFAULT_RAW_DATA_LIMIT,
    HISTOGRAM_BINS,
};
use crate::rng::SimRng;

/// Offset between consecutive per-scenario seeds.
const SCENARIO_SEED_STRIDE: u64 = 1000;

/// Portfolio run parameters.
#[derive(Clone, Debug)]
pub struct PortfolioRunConfig {
    /// Number of Monte Carlo trials.
    pub n_trials: usize,
    /// Base seed; `None` draws one from entropy (non-reproducible).
    pub seed: Option<u64>,
    /// Currency context.
    pub fx: FxConfig,
    /// Cap on exported raw samples.
    pub raw_data_limit: usize,
}

impl Default for PortfolioRunConfig {
    fn default() -> Self {
        Self {
            n_trials: 10_000,
            seed: None,
            fx: FxConfig::default(),
            raw_data_limit: DEFAULT_RAW_DATA_LIMIT,
        }
    }
}

impl PortfolioRunConfig {
    /// Config with the given trial count and seed over defaults.
    pub fn new(n_trials: usize, seed: Option<u64>) -> Self {
        Self {
            n_trials,
            seed,
            ..Default::default()
        }
    }
}

/// Per-trial operational state (1 = up, 0 = failed) for each control id.
type ControlState = BTreeMap<String, Vec<f64>>;

/// Collects reliability per control id across the plan (first occurrence
/// wins; the planner produces consistent combined values).
fn collect_control_reliability(scenarios: &[ResolvedScenario]) -> BTreeMap<String, f64> {
    let mut reliability = BTreeMap::new();
    for scenario in scenarios {
        for control in &scenario.controls {
            reliability
                .entry(control.id.clone())
                .or_insert(control.combined_reliability);
        }
    }
    reliability
}

/// Samples per-trial Bernoulli(reliability) control states.
///
/// Controls named by the copula targets are drawn jointly by thresholding
/// correlated uniforms; the remaining controls draw independently from the
/// same seeded stream (in id order, keeping runs reproducible).
fn sample_control_state(
    plan: &ExecutionPlan,
    reliability: &BTreeMap<String, f64>,
    n_trials: usize,
    seed: u64,
) -> Result<ControlState, SimError> {
    let mut rng = SimRng::from_seed(seed);
    let mut state: ControlState = BTreeMap::new();
    let mut copula_targets: Vec<&str> = Vec::new();

    if let Some(copula) = &plan.dependency {
        let matrix = CorrelationMatrix::from_rows(&copula.matrix)?;
        let uniforms = gaussian_copula_uniforms(&matrix, n_trials, &mut rng)?;
        for (target, column) in copula.targets.iter().zip(uniforms) {
            let rel = reliability.get(target).copied().unwrap_or(1.0);
            let states = column
                .into_iter()
                .map(|u| if u <= rel { 1.0 } else { 0.0 })
                .collect();
            state.insert(target.clone(), states);
            copula_targets.push(target.as_str());
        }
    }

    for (id, &rel) in reliability {
        if copula_targets.contains(&id.as_str()) {
            continue;
        }
        let states = (0..n_trials)
            .map(|_| if rng.gen_uniform() <= rel { 1.0 } else { 0.0 })
            .collect();
        state.insert(id.clone(), states);
    }

    Ok(state)
}

/// Derives per-trial frequency and severity multipliers for one scenario.
///
/// Each control contributes `reduction = effectiveness × coverage × state`
/// and multiplies `1 - reduction` into the surface(s) it affects;
/// `affects = both` applies independently to each.
fn control_multipliers(
    scenario: &ResolvedScenario,
    state: &ControlState,
    n_trials: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mut freq_mult = vec![1.0; n_trials];
    let mut sev_mult = vec![1.0; n_trials];

    for control in &scenario.controls {
        let effectiveness = control.combined_implementation_effectiveness.unwrap_or(0.0);
        let coverage = control.combined_coverage_value.unwrap_or(1.0);
        let surface = control.affects.unwrap_or(ControlSurface::Frequency);
        let states = state.get(&control.id);

        for trial in 0..n_trials {
            let up = states.map(|s| s[trial]).unwrap_or(1.0);
            let reduction = effectiveness * coverage * up;
            if surface.affects_frequency() {
                freq_mult[trial] *= 1.0 - reduction;
            }
            if surface.affects_severity() {
                sev_mult[trial] *= 1.0 - reduction;
            }
        }
    }

    (freq_mult, sev_mult)
}

/// Aggregates stacked per-scenario losses under the portfolio semantics.
fn aggregate_losses(
    method: AggregationMethod,
    scenario_losses: &[Vec<f64>],
    weights: &[Option<f64>],
    n_trials: usize,
    seed: u64,
) -> Vec<f64> {
    match method {
        AggregationMethod::Sum => (0..n_trials)
            .map(|t| scenario_losses.iter().map(|losses| losses[t]).sum())
            .collect(),
        AggregationMethod::Max => (0..n_trials)
            .map(|t| {
                scenario_losses
                    .iter()
                    .map(|losses| losses[t])
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .collect(),
        AggregationMethod::Mixture | AggregationMethod::ChooseOne => {
            // Invalid or missing weights fall back to uniform.
            let n = scenario_losses.len();
            let mut w: Vec<f64> = if weights.iter().any(|x| x.is_none()) {
                vec![1.0; n]
            } else {
                weights.iter().map(|x| x.unwrap()).collect()
            };
            let total: f64 = w.iter().sum();
            if total <= 0.0 {
                w = vec![1.0; n];
            }
            let total: f64 = w.iter().sum();
            for value in w.iter_mut() {
                *value /= total;
            }

            let mut rng = SimRng::from_seed(seed);
            (0..n_trials)
                .map(|t| {
                    let u = rng.gen_uniform();
                    let mut cumulative = 0.0;
                    let mut pick = n - 1;
                    for (idx, &weight) in w.iter().enumerate() {
                        cumulative += weight;
                        if u < cumulative {
                            pick = idx;
                            break;
                        }
                    }
                    scenario_losses[pick][t]
                })
                .collect()
        }
    }
}

/// Runs a resolved portfolio plan.
///
/// Failures (any scenario error, copula factorisation failure) surface as
/// a structured result with `success = false` and a non-empty error list;
/// there is no partial-result policy.
pub fn run_portfolio_simulation(
    plan: &ExecutionPlan,
    config: &PortfolioRunConfig,
) -> SimulationResult {
    if plan.scenarios.is_empty() {
        return SimulationResult::failure(vec![SimError::EmptyPortfolio.to_string()]);
    }
    if config.n_trials == 0 {
        return SimulationResult::failure(vec![
            "Trial count must be at least 1".to_string()
        ]);
    }

    let base_seed = config.seed.unwrap_or_else(rand::random);
    info!(
        portfolio = plan.portfolio_name.as_deref().unwrap_or("(unnamed)"),
        scenarios = plan.scenarios.len(),
        trials = config.n_trials,
        "running portfolio simulation"
    );

    let reliability = collect_control_reliability(&plan.scenarios);
    let control_state =
        match sample_control_state(plan, &reliability, config.n_trials, base_seed) {
            Ok(state) => state,
            Err(err) => return SimulationResult::failure(vec![err.to_string()]),
        };

    // Per-scenario runs are independent: each gets its own derived seed
    // and merges back by index.
    let outcomes: Vec<Result<Vec<f64>, SimError>> = plan
        .scenarios
        .par_iter()
        .enumerate()
        .map(|(idx, scenario)| {
            let scenario_seed =
                base_seed.wrapping_add(idx as u64 * SCENARIO_SEED_STRIDE);
            let mut rng = SimRng::from_seed(scenario_seed);
            let (freq_mult, sev_mult) =
                control_multipliers(scenario, &control_state, config.n_trials);
            debug!(scenario = %scenario.id, seed = scenario_seed, "scenario run");
            run_scenario(
                &scenario.frequency,
                &scenario.severity,
                config.n_trials,
                scenario.cardinality,
                Some(&RateMultiplier::PerTrial(freq_mult)),
                Some(&sev_mult),
                None,
                &config.fx,
                &mut rng,
            )
            .map_err(|e| e.in_scenario(scenario.id.clone()))
        })
        .collect();

    let mut scenario_losses: Vec<Vec<f64>> = Vec::with_capacity(outcomes.len());
    let mut errors: Vec<String> = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(losses) => scenario_losses.push(losses),
            Err(err) => errors.push(err.to_string()),
        }
    }
    if !errors.is_empty() {
        return SimulationResult::failure(errors);
    }

    let weights: Vec<Option<f64>> = plan.scenarios.iter().map(|s| s.weight).collect();
    let total = aggregate_losses(
        plan.semantics_method,
        &scenario_losses,
        &weights,
        config.n_trials,
        base_seed,
    );

    let metrics = compute_metrics(&total);
    let distribution = compute_distribution(&total, HISTOGRAM_BINS, config.raw_data_limit);
    let controls_applied = plan.scenarios.iter().any(|s| !s.controls.is_empty());

    SimulationResult {
        success: true,
        metrics: Some(metrics),
        distribution: Some(distribution),
        metadata: Some(Metadata {
            runs: config.n_trials as u64,
            seed: config.seed,
            currency: Some(config.fx.output_currency.symbol().to_string()),
            currency_code: Some(config.fx.output_currency.code().to_string()),
            model_name: plan.portfolio_name.clone(),
            model_version: None,
            description: None,
            runtime_ms: None,
            controls_applied: Some(controls_applied),
        }),
        errors: Vec::new(),
    }
}
