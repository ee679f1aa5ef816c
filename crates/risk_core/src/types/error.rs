//! Error types for structured error handling.
//!
//! This module provides:
//! - `CurrencyError`: errors from currency parsing and conversion
//! - `NumericError`: errors from tolerant numeric parsing

use thiserror::Error;

/// Currency-related errors.
///
/// # Examples
/// ```
/// use risk_core::types::error::CurrencyError;
///
/// let err = CurrencyError::UnknownCurrency("XYZ".to_string());
/// assert_eq!(format!("{}", err), "Unknown currency: XYZ");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Unknown currency code or symbol.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// No conversion rate available for a currency.
    #[error("No conversion rate configured for currency: {0}")]
    MissingRate(String),
}

/// Numeric parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    /// Input string could not be interpreted as a number.
    #[error("Cannot parse '{0}' as a number")]
    UnparsableNumber(String),

    /// A value required to be positive was not.
    #[error("Value for '{name}' must be positive, got {value}")]
    NonPositive {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}
