//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the command line.
#[derive(Error, Debug)]
pub enum CliError {
    /// Could not read an input file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Offending path.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Input document is not valid JSON of the expected shape.
    #[error("Invalid document '{path}': {source}")]
    InvalidDocument {
        /// Offending path.
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Planning produced errors.
    #[error("Planning failed with {0} error(s)")]
    PlanningFailed(usize),

    /// Simulation reported failure.
    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// CLI result alias.
pub type Result<T> = std::result::Result<T, CliError>;
