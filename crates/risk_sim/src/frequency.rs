//! Frequency sampling: per-trial event counts.
//!
//! Three models are supported:
//!
//! - `poisson`: counts from `Poisson(λ · cardinality · multiplier)`
//! - `gamma`: a continuous rate drawn from `Gamma(shape, scale)`, scaled
//!   and rounded, a frequency proxy expressing rate uncertainty
//! - `hierarchical_gamma_poisson`: a latent rate `Λ ~ Gamma(α, β)` feeding
//!   `N ~ Poisson(Λ · cardinality · multiplier)`, over-dispersed relative
//!   to plain Poisson (`Var(N) = E[Λ] + Var(Λ)`)
//!
//! Externally supplied uniforms couple the draw to a copula: the Poisson
//! and gamma models invert their CDF at the uniform, while the
//! hierarchical model couples the *latent rate* only and keeps the final
//! Poisson realisation independent given the rate.

use rand_distr::{Gamma, Poisson};

use risk_core::math::{gamma_quantile, poisson_quantile};
use risk_models::scenario::FrequencySpec;

use crate::error::SimError;
use crate::rng::SimRng;

/// Default latent-rate shape/scale for the hierarchical model when the
/// document omits them.
const DEFAULT_ALPHA_BASE: f64 = 1.5;
const DEFAULT_BETA_BASE: f64 = 1.5;

/// Control-driven frequency reduction applied before sampling/rounding.
#[derive(Clone, Debug, PartialEq)]
pub enum RateMultiplier {
    /// One factor for every trial.
    Scalar(f64),
    /// A factor per trial (length must equal the trial count).
    PerTrial(Vec<f64>),
}

impl RateMultiplier {
    fn validate(&self, n_trials: usize) -> Result<(), SimError> {
        match self {
            RateMultiplier::Scalar(_) => Ok(()),
            RateMultiplier::PerTrial(values) if values.len() == n_trials => Ok(()),
            RateMultiplier::PerTrial(values) => Err(SimError::MultiplierShape {
                expected: n_trials,
                got: values.len(),
            }),
        }
    }

    #[inline]
    fn at(&self, trial: usize) -> f64 {
        match self {
            RateMultiplier::Scalar(value) => *value,
            RateMultiplier::PerTrial(values) => values[trial],
        }
    }
}

/// A parsed frequency model.
#[derive(Clone, Debug, PartialEq)]
pub enum FrequencyModel {
    Poisson { lambda: f64 },
    Gamma { shape: f64, scale: f64 },
    HierarchicalGammaPoisson { alpha: f64, beta: f64 },
}

impl FrequencyModel {
    /// Parses the model selection from a frequency spec.
    ///
    /// Missing parameters default to zero (the degenerate all-zero-counts
    /// model); the hierarchical model falls back to its built-in
    /// shape/scale defaults instead.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnsupportedFrequencyModel`] for unknown names.
    pub fn from_spec(spec: &FrequencySpec) -> Result<Self, SimError> {
        let params = &spec.parameters;
        match spec.model.as_str() {
            "poisson" => Ok(FrequencyModel::Poisson {
                lambda: params.lambda.unwrap_or(0.0),
            }),
            "gamma" => Ok(FrequencyModel::Gamma {
                shape: params.shape.unwrap_or(0.0),
                scale: params.scale.unwrap_or(0.0),
            }),
            "hierarchical_gamma_poisson" => Ok(FrequencyModel::HierarchicalGammaPoisson {
                alpha: params.alpha_base.unwrap_or(DEFAULT_ALPHA_BASE),
                beta: params.beta_base.unwrap_or(DEFAULT_BETA_BASE),
            }),
            other => Err(SimError::UnsupportedFrequencyModel(other.to_string())),
        }
    }

    /// Draws per-trial event counts.
    ///
    /// # Arguments
    ///
    /// * `n_trials` - number of simulation trials
    /// * `cardinality` - exposure units scaling the base rate
    /// * `rate_multiplier` - optional control-driven reduction factor
    /// * `uniforms` - optional copula uniforms, one per trial
    /// * `rng` - explicit generator
    ///
    /// # Errors
    ///
    /// Shape mismatches in `rate_multiplier`/`uniforms` are fatal.
    pub fn sample_counts(
        &self,
        n_trials: usize,
        cardinality: u64,
        rate_multiplier: Option<&RateMultiplier>,
        uniforms: Option<&[f64]>,
        rng: &mut SimRng,
    ) -> Result<Vec<u64>, SimError> {
        if let Some(multiplier) = rate_multiplier {
            multiplier.validate(n_trials)?;
        }
        if let Some(u) = uniforms {
            if u.len() != n_trials {
                return Err(SimError::UniformShape {
                    expected: n_trials,
                    got: u.len(),
                });
            }
        }

        let mult_at =
            |trial: usize| rate_multiplier.map(|m| m.at(trial)).unwrap_or(1.0);
        let cardinality = cardinality as f64;

        match *self {
            FrequencyModel::Poisson { lambda } => {
                if lambda <= 0.0 {
                    return Ok(vec![0; n_trials]);
                }
                let base = lambda * cardinality;
                let mut counts = Vec::with_capacity(n_trials);
                for trial in 0..n_trials {
                    let rate = base * mult_at(trial);
                    let count = match uniforms {
                        Some(u) => poisson_quantile(u[trial], rate),
                        None => draw_poisson(rng, rate),
                    };
                    counts.push(count);
                }
                Ok(counts)
            }

            FrequencyModel::Gamma { shape, scale } => {
                if shape <= 0.0 || scale <= 0.0 {
                    return Ok(vec![0; n_trials]);
                }
                let dist = Gamma::new(shape, scale).map_err(|e| SimError::InvalidParameter {
                    name: "gamma",
                    reason: e.to_string(),
                })?;
                let mut counts = Vec::with_capacity(n_trials);
                for trial in 0..n_trials {
                    let rate = match uniforms {
                        Some(u) => gamma_quantile(u[trial], shape, scale),
                        None => rng.sample(&dist),
                    };
                    let scaled = rate * cardinality * mult_at(trial);
                    counts.push(scaled.round().max(0.0) as u64);
                }
                Ok(counts)
            }

            FrequencyModel::HierarchicalGammaPoisson { alpha, beta } => {
                if alpha <= 0.0 || beta <= 0.0 {
                    return Ok(vec![0; n_trials]);
                }
                let dist = Gamma::new(alpha, beta).map_err(|e| SimError::InvalidParameter {
                    name: "hierarchical_gamma_poisson",
                    reason: e.to_string(),
                })?;
                let mut counts = Vec::with_capacity(n_trials);
                for trial in 0..n_trials {
                    // Copula uniforms couple the latent rate; the Poisson
                    // realisation stays independent given the rate.
                    let latent = match uniforms {
                        Some(u) => gamma_quantile(u[trial], alpha, beta),
                        None => rng.sample(&dist),
                    };
                    let rate = latent * cardinality * mult_at(trial);
                    counts.push(draw_poisson(rng, rate));
                }
                Ok(counts)
            }
        }
    }
}

/// Draws one Poisson count; a non-positive rate yields zero.
fn draw_poisson(rng: &mut SimRng, rate: f64) -> u64 {
    if rate <= 0.0 {
        return 0;
    }
    match Poisson::new(rate) {
        Ok(dist) => {
            let value: f64 = rng.sample(&dist);
            value.round() as u64
        }
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_models::scenario::{FrequencyBasis, FrequencyParams};

    fn spec(model: &str, params: FrequencyParams) -> FrequencySpec {
        FrequencySpec {
            basis: FrequencyBasis::PerOrganizationPerYear,
            model: model.to_string(),
            parameters: params,
        }
    }

    fn poisson_spec(lambda: f64) -> FrequencySpec {
        spec(
            "poisson",
            FrequencyParams {
                lambda: Some(lambda),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_unknown_model_rejected() {
        let err = FrequencyModel::from_spec(&spec("weibull", FrequencyParams::default()))
            .unwrap_err();
        assert!(matches!(err, SimError::UnsupportedFrequencyModel(_)));
    }

    #[test]
    fn test_poisson_zero_lambda_all_zero() {
        let model = FrequencyModel::from_spec(&poisson_spec(0.0)).unwrap();
        let mut rng = SimRng::from_seed(1);
        let counts = model.sample_counts(100, 1, None, None, &mut rng).unwrap();
        assert!(counts.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_poisson_mean_close_to_lambda() {
        let model = FrequencyModel::from_spec(&poisson_spec(2.0)).unwrap();
        let mut rng = SimRng::from_seed(42);
        let counts = model
            .sample_counts(50_000, 1, None, None, &mut rng)
            .unwrap();
        let mean = counts.iter().sum::<u64>() as f64 / counts.len() as f64;
        assert!((mean - 2.0).abs() < 0.05, "mean {mean}");
    }

    #[test]
    fn test_poisson_cardinality_scales_rate() {
        let model = FrequencyModel::from_spec(&poisson_spec(0.5)).unwrap();
        let mut rng = SimRng::from_seed(42);
        let counts = model
            .sample_counts(50_000, 10, None, None, &mut rng)
            .unwrap();
        let mean = counts.iter().sum::<u64>() as f64 / counts.len() as f64;
        assert!((mean - 5.0).abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn test_poisson_scalar_multiplier_reduces_rate() {
        let model = FrequencyModel::from_spec(&poisson_spec(4.0)).unwrap();
        let mut rng = SimRng::from_seed(42);
        let counts = model
            .sample_counts(
                50_000,
                1,
                Some(&RateMultiplier::Scalar(0.5)),
                None,
                &mut rng,
            )
            .unwrap();
        let mean = counts.iter().sum::<u64>() as f64 / counts.len() as f64;
        assert!((mean - 2.0).abs() < 0.05, "mean {mean}");
    }

    #[test]
    fn test_per_trial_multiplier_shape_checked() {
        let model = FrequencyModel::from_spec(&poisson_spec(1.0)).unwrap();
        let mut rng = SimRng::from_seed(1);
        let err = model
            .sample_counts(
                10,
                1,
                Some(&RateMultiplier::PerTrial(vec![1.0; 3])),
                None,
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, SimError::MultiplierShape { expected: 10, got: 3 }));
    }

    #[test]
    fn test_per_trial_zero_multiplier_zeroes_counts() {
        let model = FrequencyModel::from_spec(&poisson_spec(5.0)).unwrap();
        let mut rng = SimRng::from_seed(1);
        let mut factors = vec![1.0; 50];
        for f in factors.iter_mut().skip(25) {
            *f = 0.0;
        }
        let counts = model
            .sample_counts(
                50,
                1,
                Some(&RateMultiplier::PerTrial(factors)),
                None,
                &mut rng,
            )
            .unwrap();
        assert!(counts[25..].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_poisson_uniform_coupling_is_monotone() {
        // Inverse-CDF sampling maps larger uniforms to (weakly) larger
        // counts.
        let model = FrequencyModel::from_spec(&poisson_spec(3.0)).unwrap();
        let mut rng = SimRng::from_seed(1);
        let uniforms: Vec<f64> = (1..100).map(|i| i as f64 / 100.0).collect();
        let counts = model
            .sample_counts(99, 1, None, Some(&uniforms), &mut rng)
            .unwrap();
        for pair in counts.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_uniform_shape_checked() {
        let model = FrequencyModel::from_spec(&poisson_spec(1.0)).unwrap();
        let mut rng = SimRng::from_seed(1);
        let err = model
            .sample_counts(10, 1, None, Some(&[0.5; 4]), &mut rng)
            .unwrap_err();
        assert!(matches!(err, SimError::UniformShape { expected: 10, got: 4 }));
    }

    #[test]
    fn test_gamma_frequency_rounds_scaled_rate() {
        let model = FrequencyModel::from_spec(&spec(
            "gamma",
            FrequencyParams {
                shape: Some(4.0),
                scale: Some(0.5),
                ..Default::default()
            },
        ))
        .unwrap();
        let mut rng = SimRng::from_seed(42);
        let counts = model
            .sample_counts(50_000, 3, None, None, &mut rng)
            .unwrap();
        // E[rate] = shape * scale = 2.0, scaled by cardinality 3.
        let mean = counts.iter().sum::<u64>() as f64 / counts.len() as f64;
        assert!((mean - 6.0).abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn test_gamma_degenerate_params_all_zero() {
        let model = FrequencyModel::from_spec(&spec(
            "gamma",
            FrequencyParams {
                shape: Some(0.0),
                scale: Some(1.0),
                ..Default::default()
            },
        ))
        .unwrap();
        let mut rng = SimRng::from_seed(1);
        let counts = model.sample_counts(20, 1, None, None, &mut rng).unwrap();
        assert!(counts.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_hierarchical_is_overdispersed() {
        // Var(N) = E[Λ] + Var(Λ) > E[N] for the compound process.
        let model = FrequencyModel::from_spec(&spec(
            "hierarchical_gamma_poisson",
            FrequencyParams {
                alpha_base: Some(2.0),
                beta_base: Some(3.0),
                ..Default::default()
            },
        ))
        .unwrap();
        let mut rng = SimRng::from_seed(42);
        let counts = model
            .sample_counts(100_000, 1, None, None, &mut rng)
            .unwrap();
        let n = counts.len() as f64;
        let mean = counts.iter().sum::<u64>() as f64 / n;
        let var = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        // E[Λ] = 6, Var(Λ) = 18 -> Var(N) ≈ 24 ≫ mean ≈ 6.
        assert!((mean - 6.0).abs() < 0.15, "mean {mean}");
        assert!(var > mean * 2.0, "var {var} vs mean {mean}");
    }

    #[test]
    fn test_hierarchical_defaults_applied() {
        let model = FrequencyModel::from_spec(&spec(
            "hierarchical_gamma_poisson",
            FrequencyParams::default(),
        ))
        .unwrap();
        assert_eq!(
            model,
            FrequencyModel::HierarchicalGammaPoisson {
                alpha: 1.5,
                beta: 1.5
            }
        );
    }

    #[test]
    fn test_determinism_with_fixed_seed() {
        let model = FrequencyModel::from_spec(&poisson_spec(2.0)).unwrap();
        let a = model
            .sample_counts(1000, 1, None, None, &mut SimRng::from_seed(9))
            .unwrap();
        let b = model
            .sample_counts(1000, 1, None, None, &mut SimRng::from_seed(9))
            .unwrap();
        assert_eq!(a, b);
    }
}
