//! # Risk Core (Foundation Layer)
//!
//! Foundation crate for the cyrisk workspace. Provides the building blocks
//! shared by every other layer:
//!
//! - [`numeric`]: tolerant parsing of human-entered numeric strings
//!   (thousands separators, percentages)
//! - [`types`]: currency codes and structured error types
//! - [`fx`]: currency conversion context (base/output currencies, rates)
//! - [`math`]: standard-normal distribution functions, incomplete gamma,
//!   and the discrete/continuous quantile functions used for copula-coupled
//!   sampling
//!
//! This crate deliberately contains no randomness and no I/O.

pub mod fx;
pub mod math;
pub mod numeric;
pub mod types;

pub use fx::FxConfig;
pub use types::currency::Currency;
pub use types::error::{CurrencyError, NumericError};
