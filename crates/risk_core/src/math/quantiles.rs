//! Quantile functions for copula-coupled sampling.
//!
//! When event counts must carry a prescribed dependence structure, the
//! samplers evaluate these inverse CDFs at correlated uniforms instead of
//! drawing independently (the NORTA construction).

use super::distributions::norm_ppf;
use super::special::{gamma_p, ln_gamma};

/// Smallest probability treated as distinct from the interval endpoints.
const P_CLAMP: f64 = 1e-12;

/// Poisson quantile function.
///
/// Returns the smallest `k` such that `P(X <= k) >= p` for
/// `X ~ Poisson(rate)`.
///
/// A non-positive rate yields 0. For very large rates (where `exp(-rate)`
/// underflows) the normal approximation with continuity correction is used.
///
/// # Examples
/// ```
/// use risk_core::math::poisson_quantile;
///
/// assert_eq!(poisson_quantile(0.5, 2.0), 2);
/// assert_eq!(poisson_quantile(0.01, 2.0), 0);
/// ```
pub fn poisson_quantile(p: f64, rate: f64) -> u64 {
    if rate <= 0.0 {
        return 0;
    }
    let p = p.clamp(P_CLAMP, 1.0 - P_CLAMP);

    // exp(-rate) underflows around rate ~ 745; switch to the normal
    // approximation well before that.
    if rate > 500.0 {
        let k = rate + rate.sqrt() * norm_ppf(p);
        return k.round().max(0.0) as u64;
    }

    let mut k: u64 = 0;
    let mut pmf = (-rate).exp();
    let mut cdf = pmf;
    let cap = (rate + 10.0 * rate.sqrt() + 100.0) as u64;
    while cdf < p && k < cap {
        k += 1;
        pmf *= rate / k as f64;
        cdf += pmf;
    }
    k
}

/// Gamma quantile function.
///
/// Returns `x` such that `P(X <= x) = p` for
/// `X ~ Gamma(shape, scale)` (scale parameterisation).
///
/// Non-positive shape or scale yields 0. The solver starts from the
/// Wilson–Hilferty approximation and refines with safeguarded Newton steps
/// on the regularized incomplete gamma function.
///
/// # Examples
/// ```
/// use risk_core::math::gamma_quantile;
///
/// // Gamma(1, 1) is Exponential(1): quantile is -ln(1 - p)
/// let x = gamma_quantile(0.5, 1.0, 1.0);
/// assert!((x - std::f64::consts::LN_2).abs() < 1e-9);
/// ```
pub fn gamma_quantile(p: f64, shape: f64, scale: f64) -> f64 {
    if shape <= 0.0 || scale <= 0.0 {
        return 0.0;
    }
    let p = p.clamp(P_CLAMP, 1.0 - P_CLAMP);

    // Wilson–Hilferty starting point (unit scale).
    let g = 1.0 / (9.0 * shape);
    let z = norm_ppf(p);
    let cube = 1.0 - g + z * g.sqrt();
    let mut x = if cube > 0.0 {
        shape * cube.powi(3)
    } else {
        // Deep left tail of a small-shape gamma; any small positive start
        // works, bisection takes over.
        shape * 1e-3
    };

    // Bracket the root.
    let mut lo = 0.0_f64;
    let mut hi = (x.max(shape) + 10.0) * 2.0;
    while gamma_p(shape, hi) < p {
        hi *= 2.0;
        if hi > 1e300 {
            break;
        }
    }
    x = x.clamp(lo + f64::MIN_POSITIVE, hi);

    for _ in 0..100 {
        let f = gamma_p(shape, x) - p;
        if f > 0.0 {
            hi = x;
        } else {
            lo = x;
        }

        // Newton step: f' is the Gamma(shape, 1) density at x.
        let ln_pdf = (shape - 1.0) * x.ln() - x - ln_gamma(shape);
        let step = f / ln_pdf.exp();
        let mut next = x - step;
        if !next.is_finite() || next <= lo || next >= hi {
            next = 0.5 * (lo + hi);
        }
        if (next - x).abs() <= 1e-12 * x.max(1.0) {
            x = next;
            break;
        }
        x = next;
    }

    x * scale
}
