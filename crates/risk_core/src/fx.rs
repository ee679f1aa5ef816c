//! Currency conversion context.
//!
//! The engine works internally in a single base currency and re-expresses
//! results in an output currency. Conversion goes through a USD-pivot rate
//! table: each rate is the value of one unit of that currency in USD.
//!
//! The context is a plain value object; loading it from a configuration
//! document is the service layer's job.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::types::currency::Currency;

/// Built-in conversion rates (value of one unit in USD).
///
/// Used when no rate document is supplied, and as the fallback layer under
/// partial user-provided tables.
pub fn default_rates() -> HashMap<Currency, f64> {
    HashMap::from([
        (Currency::USD, 1.0),
        (Currency::EUR, 1.08),
        (Currency::GBP, 1.27),
        (Currency::JPY, 0.0068),
        (Currency::CHF, 1.12),
    ])
}

/// Currency conversion configuration.
///
/// # Examples
///
/// ```
/// use risk_core::fx::FxConfig;
/// use risk_core::types::currency::Currency;
///
/// let fx = FxConfig::default();
/// assert_eq!(fx.base_currency, Currency::USD);
/// // Same-currency conversion is the identity.
/// assert_eq!(fx.convert(100.0, Currency::USD, Currency::USD), 100.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FxConfig {
    /// Currency all severities are normalised into before aggregation.
    pub base_currency: Currency,
    /// Currency results are reported in.
    pub output_currency: Currency,
    /// Value of one unit of each currency in USD.
    pub rates: HashMap<Currency, f64>,
    /// Optional rate snapshot date.
    pub as_of: Option<NaiveDate>,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            base_currency: Currency::USD,
            output_currency: Currency::USD,
            rates: default_rates(),
            as_of: None,
        }
    }
}

impl FxConfig {
    /// Creates a config with the given currencies over the default rate table.
    pub fn new(base_currency: Currency, output_currency: Currency) -> Self {
        Self {
            base_currency,
            output_currency,
            ..Self::default()
        }
    }

    /// Overlays user-provided rates on the defaults.
    ///
    /// Currencies absent from `rates` keep their built-in value, so a rate
    /// document only needs to list the currencies it overrides.
    pub fn with_rates(mut self, rates: HashMap<Currency, f64>) -> Self {
        let mut merged = default_rates();
        merged.extend(rates);
        self.rates = merged;
        self
    }

    /// Looks up the USD value of one unit of `currency`.
    ///
    /// Unlisted currencies convert at parity; the merged rate table covers
    /// every supported currency, so this only happens for configs built by
    /// hand with a partial map.
    fn rate(&self, currency: Currency) -> f64 {
        self.rates.get(&currency).copied().unwrap_or(1.0)
    }

    /// Converts a monetary amount between currencies via the USD pivot.
    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> f64 {
        if from == to {
            return amount;
        }
        let usd_amount = amount * self.rate(from);
        usd_amount / self.rate(to)
    }

    /// Normalises an amount into the base currency.
    pub fn to_base(&self, amount: f64, from: Currency) -> f64 {
        self.convert(amount, from, self.base_currency)
    }

    /// The scalar factor taking base-currency amounts to the output currency.
    pub fn output_factor(&self) -> f64 {
        self.convert(1.0, self.base_currency, self.output_currency)
    }
}
