//! Single-scenario trial loop.
//!
//! A scenario run is: draw per-trial event counts, draw one severity per
//! event, hand the next `counts[i]` severities back to trial *i*, apply
//! the per-trial severity multiplier, and re-express in the output
//! currency with a single scalar factor.

use tracing::debug;

use risk_core::fx::FxConfig;
use risk_models::scenario::{FrequencySpec, ScenarioDocument, SeveritySpec};

use crate::error::SimError;
use crate::frequency::{FrequencyModel, RateMultiplier};
use crate::result::{
    compute_distribution, compute_metrics, Metadata, SimulationResult, DEFAULT_RAW_DATA_LIMIT,
    HISTOGRAM_BINS,
};
use crate::rng::SimRng;
use crate::severity::sample_severities;

/// Runs one scenario and returns per-trial annual losses in the output
/// currency.
///
/// # Arguments
///
/// * `frequency`/`severity` - embedded model specs from the plan
/// * `n_trials` - number of Monte Carlo trials
/// * `cardinality` - resolved exposure cardinality
/// * `freq_multiplier` - optional control-driven rate reduction
/// * `sev_multiplier` - optional per-trial severity multiplier
/// * `uniforms` - optional copula uniforms coupling the frequency draw
/// * `fx` - currency context (severities normalise to base, output is one
///   scalar factor away)
/// * `rng` - this scenario's own generator
///
/// # Errors
///
/// Model and shape errors are fatal to the scenario.
#[allow(clippy::too_many_arguments)]
pub fn run_scenario(
    frequency: &FrequencySpec,
    severity: &SeveritySpec,
    n_trials: usize,
    cardinality: u64,
    freq_multiplier: Option<&RateMultiplier>,
    sev_multiplier: Option<&[f64]>,
    uniforms: Option<&[f64]>,
    fx: &FxConfig,
    rng: &mut SimRng,
) -> Result<Vec<f64>, SimError> {
    if let Some(mult) = sev_multiplier {
        if mult.len() != n_trials {
            return Err(SimError::MultiplierShape {
                expected: n_trials,
                got: mult.len(),
            });
        }
    }

    let model = FrequencyModel::from_spec(frequency)?;
    let counts = model.sample_counts(n_trials, cardinality, freq_multiplier, uniforms, rng)?;

    let total_events: u64 = counts.iter().sum();
    debug!(total_events, n_trials, "scenario event counts drawn");

    let severities = sample_severities(severity, total_events as usize, fx, rng)?;

    // Partition severities back per trial: trial i consumes the next
    // counts[i] entries.
    let mut losses = Vec::with_capacity(n_trials);
    let mut cursor = 0usize;
    for (trial, &count) in counts.iter().enumerate() {
        let count = count as usize;
        let trial_loss: f64 = severities[cursor..cursor + count].iter().sum();
        cursor += count;

        let multiplier = sev_multiplier.map(|m| m[trial]).unwrap_or(1.0);
        losses.push(trial_loss * multiplier);
    }

    let output_factor = fx.output_factor();
    if output_factor != 1.0 {
        for loss in losses.iter_mut() {
            *loss *= output_factor;
        }
    }

    Ok(losses)
}

/// Runs a standalone scenario document and packages a full result.
///
/// Cardinality is fixed to 1: a bare scenario carries no asset bindings;
/// exposure scaling is the planner's job.
pub fn run_scenario_document(
    document: &ScenarioDocument,
    n_trials: usize,
    seed: Option<u64>,
    fx: &FxConfig,
) -> SimulationResult {
    if n_trials == 0 {
        return SimulationResult::failure(vec!["Trial count must be at least 1".to_string()]);
    }

    let base_seed = seed.unwrap_or_else(rand::random);
    let mut rng = SimRng::from_seed(base_seed);

    let losses = match run_scenario(
        &document.scenario.frequency,
        &document.scenario.severity,
        n_trials,
        1,
        None,
        None,
        None,
        fx,
        &mut rng,
    ) {
        Ok(losses) => losses,
        Err(err) => return SimulationResult::failure(vec![err.to_string()]),
    };

    let metrics = compute_metrics(&losses);
    let distribution = compute_distribution(&losses, HISTOGRAM_BINS, DEFAULT_RAW_DATA_LIMIT);

    SimulationResult {
        success: true,
        metrics: Some(metrics),
        distribution: Some(distribution),
        metadata: Some(Metadata {
            runs: n_trials as u64,
            seed,
            currency: Some(fx.output_currency.symbol().to_string()),
            currency_code: Some(fx.output_currency.code().to_string()),
            model_name: document.meta.name.clone(),
            model_version: document.meta.version.clone(),
            description: document.meta.description.clone(),
            runtime_ms: None,
            controls_applied: None,
        }),
        errors: Vec::new(),
    }
}
