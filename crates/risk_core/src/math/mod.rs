//! Numerical routines shared by the samplers.
//!
//! - [`distributions`]: standard normal CDF/PDF and inverse CDF
//! - [`special`]: log-gamma and the regularized incomplete gamma function
//! - [`quantiles`]: Poisson and gamma quantile functions (inverse CDFs)
//!   used to couple frequency draws to copula uniforms

pub mod distributions;
pub mod quantiles;
pub mod special;

pub use distributions::{norm_cdf, norm_pdf, norm_ppf};
pub use quantiles::{gamma_quantile, poisson_quantile};
pub use special::{gamma_p, ln_gamma};
