//! Currency types for loss amounts.
//!
//! This module provides ISO 4217 currency codes with display symbols and
//! serialisation support. Loss documents may reference currencies either by
//! code (`"EUR"`) or by symbol (`"€"`); both parse to the same variant.
//!
//! # Examples
//!
//! ```
//! use risk_core::types::currency::Currency;
//!
//! let usd = Currency::USD;
//! assert_eq!(usd.code(), "USD");
//! assert_eq!(usd.symbol(), "$");
//!
//! let eur: Currency = "€".parse().unwrap();
//! assert_eq!(eur, Currency::EUR);
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::CurrencyError;

/// ISO 4217 currency codes supported by the engine.
///
/// The set covers the currencies carried by the built-in rate table; unknown
/// codes are rejected at parse time rather than silently passed through.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    /// United States Dollar
    USD,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Swiss Franc
    CHF,
}

impl Currency {
    /// All supported currencies, in a stable order.
    pub const ALL: [Currency; 5] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CHF,
    ];

    /// Returns the ISO 4217 three-letter currency code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
        }
    }

    /// Returns the display symbol for reports and console output.
    ///
    /// Currencies without a common single-character symbol display their
    /// code instead.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CHF => "CHF",
        }
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    /// Parses an ISO 4217 code (case-insensitive) or a display symbol.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "$" => return Ok(Currency::USD),
            "€" => return Ok(Currency::EUR),
            "£" => return Ok(Currency::GBP),
            "¥" => return Ok(Currency::JPY),
            _ => {}
        }
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "CHF" => Ok(Currency::CHF),
            other => Err(CurrencyError::UnknownCurrency(other.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.code().to_string()
    }
}
