//! Simulation result types and summary statistics.
//!
//! Percentiles use linear interpolation between order statistics and the
//! standard deviation is the population form.

use serde::{Deserialize, Serialize};

/// Number of histogram bins in distribution artifacts.
pub const HISTOGRAM_BINS: usize = 50;

/// Default cap on exported raw samples.
pub const DEFAULT_RAW_DATA_LIMIT: usize = 1000;

/// Summary statistics of the annual loss distribution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Expected annual loss (mean).
    pub eal: f64,
    /// Value at Risk at the 95th percentile.
    pub var_95: f64,
    /// Value at Risk at the 99th percentile.
    pub var_99: f64,
    /// Value at Risk at the 99.9th percentile.
    pub var_999: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Histogram plus (possibly truncated) raw samples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Histogram bin edges (`bins.len() == frequencies.len() + 1`).
    pub bins: Vec<f64>,
    /// Histogram bin counts.
    pub frequencies: Vec<u64>,
    /// Raw sample losses, truncated to the export limit.
    pub raw_data: Vec<f64>,
}

/// Run context attached to a result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Number of simulation trials.
    pub runs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Output currency display symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Output currency ISO code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls_applied: Option<bool>,
}

/// Top-level simulation outcome.
///
/// Failures carry `success = false` and a non-empty error list rather than
/// surfacing as faults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl SimulationResult {
    /// A failed result carrying the given error messages.
    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
            ..Default::default()
        }
    }
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in percent (e.g. `95.0`). The input need not be sorted.
pub fn percentile(samples: &[f64], q: f64) -> f64 {
    assert!(!samples.is_empty(), "percentile of empty sample set");
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN losses"));
    percentile_sorted(&sorted, q)
}

fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// Computes the full metric set over loss samples.
pub fn compute_metrics(samples: &[f64]) -> Metrics {
    let n = samples.len() as f64;
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN losses"));

    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;

    Metrics {
        eal: mean,
        var_95: percentile_sorted(&sorted, 95.0),
        var_99: percentile_sorted(&sorted, 99.0),
        var_999: percentile_sorted(&sorted, 99.9),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        median: percentile_sorted(&sorted, 50.0),
        std_dev: variance.sqrt(),
    }
}

/// Builds the fixed-bin histogram and truncated raw export.
pub fn compute_distribution(samples: &[f64], bin_count: usize, raw_limit: usize) -> Distribution {
    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // Degenerate spread still yields a well-formed histogram.
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bin_count as f64;

    let bins: Vec<f64> = (0..=bin_count).map(|i| lo + width * i as f64).collect();
    let mut frequencies = vec![0u64; bin_count];
    for &x in samples {
        let idx = (((x - lo) / width) as usize).min(bin_count - 1);
        frequencies[idx] += 1;
    }

    Distribution {
        bins,
        frequencies,
        raw_data: samples.iter().take(raw_limit).cloned().collect(),
    }
}
