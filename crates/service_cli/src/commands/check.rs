//! `cyrisk check` - print build and configuration information.

use risk_core::fx::FxConfig;
use risk_core::types::currency::Currency;

use crate::error::Result;

pub fn run(fx: FxConfig) -> Result<()> {
    println!("cyrisk {}", env!("CARGO_PKG_VERSION"));
    println!(
        "Base currency: {}  Output currency: {}",
        fx.base_currency, fx.output_currency
    );
    if let Some(as_of) = fx.as_of {
        println!("FX rates as of: {as_of}");
    }
    println!("Configured rates (1 unit in USD):");
    for currency in Currency::ALL {
        if let Some(rate) = fx.rates.get(&currency) {
            println!("  {currency}: {rate}");
        }
    }
    Ok(())
}
