//! Severity sampling: per-event loss magnitudes.
//!
//! Supported models:
//!
//! - `lognormal`: parameterised by `(median, sigma)` or `(mu, sigma)`, or
//!   auto-calibrated from observed single-event losses
//! - `gamma`: `(shape, scale)`
//! - `mixture`: samples exclusively the first listed component, a
//!   documented limitation kept for cross-engine result compatibility
//!
//! All monetary parameters are normalised into the base currency before
//! sampling: a lognormal `median` and a gamma `scale` convert as direct
//! amounts, while a lognormal `mu` shifts additively by `ln(rate)`.

use rand_distr::{Gamma, LogNormal};

use risk_core::fx::FxConfig;
use risk_core::types::currency::Currency;
use risk_models::scenario::{SeverityComponent, SeverityParams, SeveritySpec};

use crate::error::SimError;
use crate::rng::SimRng;

/// Calibrates lognormal `(mu, sigma)` from observed single-event losses.
///
/// Losses are converted into the base currency first, then
/// `mu = ln(median(losses))` and `sigma` is the population standard
/// deviation of the log losses.
///
/// # Errors
///
/// Requires at least two values, all strictly positive after conversion.
pub fn calibrate_lognormal_from_single_losses(
    single_losses: &[f64],
    currency: Option<Currency>,
    fx: &FxConfig,
) -> Result<(f64, f64), SimError> {
    if single_losses.len() < 2 {
        return Err(SimError::InvalidParameter {
            name: "single_losses",
            reason: "must contain at least 2 values".to_string(),
        });
    }

    let from = currency.unwrap_or(fx.base_currency);
    let losses_base: Vec<f64> = single_losses
        .iter()
        .map(|&v| fx.to_base(v, from))
        .collect();

    if losses_base.iter().any(|&v| v <= 0.0) {
        return Err(SimError::InvalidParameter {
            name: "single_losses",
            reason: "values must be positive".to_string(),
        });
    }

    let mu = median(&losses_base).ln();
    let log_losses: Vec<f64> = losses_base.iter().map(|v| v.ln()).collect();
    let sigma = population_std(&log_losses);
    Ok((mu, sigma))
}

/// Median with the even-length average convention.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN losses"));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt()
}

/// A severity model with parameters resolved into the base currency.
#[derive(Clone, Debug, PartialEq)]
enum ResolvedSeverity {
    Lognormal { mu: f64, sigma: f64 },
    Gamma { shape: f64, scale: f64 },
}

fn resolve_lognormal(params: &SeverityParams, fx: &FxConfig) -> Result<ResolvedSeverity, SimError> {
    if let Some(single_losses) = &params.single_losses {
        if params.median.is_some() || params.mu.is_some() {
            return Err(SimError::InvalidParameter {
                name: "single_losses",
                reason: "cannot combine 'single_losses' calibration with direct \
                         'median'/'mu' parameters"
                    .to_string(),
            });
        }
        let (mu, sigma) =
            calibrate_lognormal_from_single_losses(single_losses, params.currency, fx)?;
        return Ok(ResolvedSeverity::Lognormal { mu, sigma });
    }

    let currency = params.currency.unwrap_or(fx.base_currency);

    let mu = match (params.median, params.mu) {
        (Some(_), Some(_)) => {
            return Err(SimError::InvalidParameter {
                name: "median",
                reason: "cannot use both 'median' and 'mu'; choose one \
                         (median is recommended)"
                    .to_string(),
            });
        }
        (Some(median), None) => {
            let median_base = fx.to_base(median, currency);
            if median_base <= 0.0 {
                return Err(SimError::InvalidParameter {
                    name: "median",
                    reason: format!("must be positive, got {median_base}"),
                });
            }
            median_base.ln()
        }
        (None, Some(mu)) => {
            // Currency changes shift mu additively in log space.
            if currency != fx.base_currency {
                mu + fx.to_base(1.0, currency).ln()
            } else {
                mu
            }
        }
        (None, None) => {
            return Err(SimError::InvalidParameter {
                name: "median",
                reason: "lognormal severity requires 'median' or 'mu' (or \
                         'single_losses' for auto-calibration)"
                    .to_string(),
            });
        }
    };

    let sigma = params.sigma.ok_or(SimError::InvalidParameter {
        name: "sigma",
        reason: "lognormal severity requires 'sigma'".to_string(),
    })?;
    if sigma <= 0.0 {
        return Err(SimError::InvalidParameter {
            name: "sigma",
            reason: format!("must be positive, got {sigma}"),
        });
    }

    Ok(ResolvedSeverity::Lognormal { mu, sigma })
}

fn resolve_gamma(params: &SeverityParams, fx: &FxConfig) -> Result<ResolvedSeverity, SimError> {
    let shape = params.shape.unwrap_or(0.0);
    let scale = params.scale.unwrap_or(0.0);
    if shape <= 0.0 || scale <= 0.0 {
        return Err(SimError::InvalidParameter {
            name: "shape",
            reason: format!(
                "gamma severity requires positive shape and scale, got shape={shape}, \
                 scale={scale}"
            ),
        });
    }
    let currency = params.currency.unwrap_or(fx.base_currency);
    Ok(ResolvedSeverity::Gamma {
        shape,
        // Scale converts linearly as a monetary amount.
        scale: fx.to_base(scale, currency),
    })
}

fn resolve_mixture(
    components: Option<&[SeverityComponent]>,
    fx: &FxConfig,
) -> Result<ResolvedSeverity, SimError> {
    let first = components
        .and_then(|c| c.first())
        .ok_or(SimError::InvalidParameter {
            name: "components",
            reason: "mixture severity requires at least one component".to_string(),
        })?;

    // Only the first listed component is sampled; kept for cross-engine
    // result compatibility.
    if let Some(params) = &first.lognormal {
        return resolve_lognormal(params, fx);
    }
    if let Some(params) = &first.gamma {
        return resolve_gamma(params, fx);
    }
    Err(SimError::InvalidParameter {
        name: "components",
        reason: "mixture component must define 'lognormal' or 'gamma'".to_string(),
    })
}

fn resolve(spec: &SeveritySpec, fx: &FxConfig) -> Result<ResolvedSeverity, SimError> {
    match spec.model.as_str() {
        "lognormal" => resolve_lognormal(&spec.parameters, fx),
        "gamma" => resolve_gamma(&spec.parameters, fx),
        "mixture" => resolve_mixture(spec.components.as_deref(), fx),
        other => Err(SimError::UnsupportedSeverityModel(other.to_string())),
    }
}

/// Draws `total_events` loss amounts in the base currency.
///
/// Zero events returns an empty vector without touching any distribution.
///
/// # Errors
///
/// Unknown model names and degenerate parameters (non-positive sigma,
/// shape, scale or median) are fatal.
pub fn sample_severities(
    spec: &SeveritySpec,
    total_events: usize,
    fx: &FxConfig,
    rng: &mut SimRng,
) -> Result<Vec<f64>, SimError> {
    if total_events == 0 {
        return Ok(Vec::new());
    }

    match resolve(spec, fx)? {
        ResolvedSeverity::Lognormal { mu, sigma } => {
            let dist = LogNormal::new(mu, sigma).map_err(|e| SimError::InvalidParameter {
                name: "lognormal",
                reason: e.to_string(),
            })?;
            Ok((0..total_events).map(|_| rng.sample(&dist)).collect())
        }
        ResolvedSeverity::Gamma { shape, scale } => {
            let dist = Gamma::new(shape, scale).map_err(|e| SimError::InvalidParameter {
                name: "gamma",
                reason: e.to_string(),
            })?;
            Ok((0..total_events).map(|_| rng.sample(&dist)).collect())
        }
    }
}
