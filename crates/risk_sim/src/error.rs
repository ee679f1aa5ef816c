//! Error types for the simulation engine.
//!
//! Simulation errors are fatal to the scenario they occur in, and a
//! portfolio run fails wholesale on any scenario failure: there is no
//! partial-result policy.

use thiserror::Error;

/// Categorised simulation errors.
#[derive(Error, Debug)]
pub enum SimError {
    /// Frequency model name not recognised by this engine build.
    #[error("Unsupported frequency model '{0}'")]
    UnsupportedFrequencyModel(String),

    /// Severity model name not recognised by this engine build.
    #[error("Unsupported severity model '{0}'")]
    UnsupportedSeverityModel(String),

    /// Degenerate or inconsistent distribution parameters.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// A per-trial rate multiplier of the wrong length.
    #[error("Rate multiplier must be a scalar or have length {expected}, got {got}")]
    MultiplierShape {
        /// Expected length (the trial count).
        expected: usize,
        /// Provided length.
        got: usize,
    },

    /// Externally supplied uniforms of the wrong length.
    #[error("Uniform variates must have length {expected}, got {got}")]
    UniformShape {
        /// Expected length (the trial count).
        expected: usize,
        /// Provided length.
        got: usize,
    },

    /// Correlation matrix failed structural validation.
    #[error("Invalid correlation matrix: {0}")]
    InvalidCorrelation(String),

    /// Cholesky factorisation failed even after the jitter retry.
    #[error("Correlation matrix is not positive definite (after jitter retry)")]
    NotPositiveDefinite,

    /// A scenario inside a portfolio run failed.
    #[error("Scenario '{id}' failed: {source}")]
    Scenario {
        /// Scenario id from the plan.
        id: String,
        /// Underlying failure.
        #[source]
        source: Box<SimError>,
    },

    /// The execution plan holds no scenarios.
    #[error("Portfolio contains no scenarios")]
    EmptyPortfolio,
}

impl SimError {
    /// Wraps an error with the scenario it occurred in.
    pub fn in_scenario(self, id: impl Into<String>) -> Self {
        SimError::Scenario {
            id: id.into(),
            source: Box::new(self),
        }
    }
}
