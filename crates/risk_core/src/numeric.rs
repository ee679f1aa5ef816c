//! Tolerant parsing for human-entered numeric strings.
//!
//! Risk documents are written by analysts, not machines: values arrive as
//! `"1 000"` (ISO 80000-1 thin space or regular space), `"1,234.56"`, or
//! `"50%"`. Every document loader normalizes through [`parse_numberish`]
//! before numbers reach the engine.

use crate::types::error::NumericError;

/// Parses a numeric string that may contain space/comma thousands
/// separators or a trailing percent sign.
///
/// # Examples
///
/// ```
/// use risk_core::numeric::parse_numberish;
///
/// assert_eq!(parse_numberish("1 000").unwrap(), 1000.0);
/// assert_eq!(parse_numberish("50%").unwrap(), 0.5);
/// assert_eq!(parse_numberish("1,234.56").unwrap(), 1234.56);
/// ```
///
/// # Errors
///
/// Returns [`NumericError::UnparsableNumber`] when the cleaned string is not
/// a valid floating point literal.
pub fn parse_numberish(value: &str) -> Result<f64, NumericError> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{202f}' | '\u{00a0}' | ','))
        .collect();

    let unparsable = || NumericError::UnparsableNumber(value.to_string());

    if let Some(stripped) = cleaned.strip_suffix('%') {
        let pct: f64 = stripped.parse().map_err(|_| unparsable())?;
        return Ok(pct / 100.0);
    }

    cleaned.parse().map_err(|_| unparsable())
}
