//! Structured planning diagnostics.
//!
//! The planner reports problems by accumulating messages instead of
//! returning early; callers get every issue in one pass.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a planning diagnostic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    /// Fatal to plan production.
    Error,
    /// Informational; never blocks the plan.
    Warning,
}

/// One diagnostic tied to a logical document path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanMessage {
    pub level: MessageLevel,
    /// Logical document path where the issue occurred,
    /// e.g. `portfolio.scenarios[2].binding.applies_to_assets`.
    pub path: String,
    pub message: String,
}

impl PlanMessage {
    /// Creates an error-level message.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a warning-level message.
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PlanMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            MessageLevel::Error => "error",
            MessageLevel::Warning => "warning",
        };
        write!(f, "[{level}] {}: {}", self.path, self.message)
    }
}
