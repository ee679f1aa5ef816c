//! Conversion of a [`SimulationResult`] into the engine-agnostic envelope.

use chrono::Utc;

use risk_models::envelope::{
    Artifact, CurrencyUnit, EngineInfo, EnvelopeResult, InputInfo, Measure, ResultsBlock,
    RunInfo, SimulationResultEnvelope, Units,
};

use crate::result::SimulationResult;

const LOSS_VAR_ID: &str = "loss.var";
const VALUE_AT_RISK_LABEL: &str = "Value at Risk";

/// Re-expresses a result as named measures and artifacts.
///
/// The envelope is a stable interchange format: downstream consumers never
/// need to know which engine produced it.
pub fn to_envelope(result: &SimulationResult) -> SimulationResultEnvelope {
    let metadata = result.metadata.as_ref();
    let currency_code = metadata.and_then(|m| m.currency_code.clone());
    let currency_symbol = metadata.and_then(|m| m.currency.clone());
    let currency_unit = currency_code.as_ref().map(|code| CurrencyUnit {
        code: code.clone(),
        symbol: currency_symbol.clone(),
    });

    let mut results = ResultsBlock::default();

    if let Some(metrics) = &result.metrics {
        let point = |id: &str, label: &str, value: f64| Measure {
            id: id.to_string(),
            label: label.to_string(),
            value,
            unit: currency_unit.clone(),
            parameters: None,
        };
        results.measures.extend([
            point("loss.eal", "Expected Annual Loss", metrics.eal),
            point("loss.min", "Minimum Loss", metrics.min),
            point("loss.max", "Maximum Loss", metrics.max),
            point("loss.median", "Median Loss", metrics.median),
            point("loss.std_dev", "Standard Deviation", metrics.std_dev),
        ]);

        for (level, value) in [
            (0.95, metrics.var_95),
            (0.99, metrics.var_99),
            (0.999, metrics.var_999),
        ] {
            results.measures.push(Measure {
                id: LOSS_VAR_ID.to_string(),
                label: VALUE_AT_RISK_LABEL.to_string(),
                value,
                unit: currency_unit.clone(),
                parameters: Some(serde_json::json!({ "level": level })),
            });
        }
    }

    if let Some(distribution) = &result.distribution {
        if !distribution.bins.is_empty() && !distribution.frequencies.is_empty() {
            results.artifacts.push(Artifact::Histogram {
                id: "loss.annual".to_string(),
                unit: currency_unit.clone(),
                bin_edges: distribution.bins.clone(),
                counts: distribution.frequencies.clone(),
                binning: serde_json::json!({
                    "method": "fixed_bins",
                    "bin_count": distribution.bins.len().saturating_sub(1),
                }),
            });
        }
        if !distribution.raw_data.is_empty() {
            results.artifacts.push(Artifact::Samples {
                id: "loss.annual".to_string(),
                unit: currency_unit.clone(),
                values: distribution.raw_data.clone(),
                sample_count_total: metadata.map(|m| m.runs),
                sample_count_returned: distribution.raw_data.len() as u64,
                sampling: serde_json::json!({ "method": "first_n" }),
            });
        }
    }

    SimulationResultEnvelope {
        result: EnvelopeResult {
            success: result.success,
            errors: result.errors.clone(),
            warnings: Vec::new(),
            engine: EngineInfo {
                name: "cyrisk".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            run: RunInfo {
                runs: metadata.map(|m| m.runs),
                seed: metadata.and_then(|m| m.seed),
                runtime_ms: metadata.and_then(|m| m.runtime_ms),
                started_at: Some(Utc::now()),
            },
            inputs: InputInfo {
                model_name: metadata.and_then(|m| m.model_name.clone()),
                model_version: metadata.and_then(|m| m.model_version.clone()),
                description: metadata.and_then(|m| m.description.clone()),
            },
            units: Units {
                currency: CurrencyUnit {
                    code: currency_code.unwrap_or_else(|| "USD".to_string()),
                    symbol: currency_symbol,
                },
                horizon: "annual".to_string(),
            },
            results,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{Distribution, Metadata, Metrics};

    fn sample_result() -> SimulationResult {
        SimulationResult {
            success: true,
            metrics: Some(Metrics {
                eal: 2266.0,
                var_95: 5000.0,
                var_99: 9000.0,
                var_999: 15000.0,
                min: 0.0,
                max: 20000.0,
                median: 1500.0,
                std_dev: 2500.0,
            }),
            distribution: Some(Distribution {
                bins: vec![0.0, 1.0, 2.0],
                frequencies: vec![5, 5],
                raw_data: vec![0.5, 1.5],
            }),
            metadata: Some(Metadata {
                runs: 10,
                seed: Some(42),
                currency: Some("$".to_string()),
                currency_code: Some("USD".to_string()),
                model_name: Some("P".to_string()),
                ..Default::default()
            }),
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_envelope_measures() {
        let envelope = to_envelope(&sample_result());
        let measures = &envelope.result.results.measures;

        let eal = measures.iter().find(|m| m.id == "loss.eal").unwrap();
        assert_eq!(eal.value, 2266.0);
        assert_eq!(eal.unit.as_ref().unwrap().code, "USD");

        let var_levels: Vec<f64> = measures
            .iter()
            .filter(|m| m.id == "loss.var")
            .map(|m| m.parameters.as_ref().unwrap()["level"].as_f64().unwrap())
            .collect();
        assert_eq!(var_levels, vec![0.95, 0.99, 0.999]);
    }

    #[test]
    fn test_envelope_artifacts() {
        let envelope = to_envelope(&sample_result());
        let artifacts = &envelope.result.results.artifacts;
        assert_eq!(artifacts.len(), 2);
        match &artifacts[1] {
            Artifact::Samples {
                sample_count_total,
                sample_count_returned,
                ..
            } => {
                assert_eq!(*sample_count_total, Some(10));
                assert_eq!(*sample_count_returned, 2);
            }
            other => panic!("expected samples artifact, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_result_keeps_errors() {
        let failed = SimulationResult::failure(vec!["bad matrix".to_string()]);
        let envelope = to_envelope(&failed);
        assert!(!envelope.result.success);
        assert_eq!(envelope.result.errors, vec!["bad matrix"]);
        assert!(envelope.result.results.measures.is_empty());
    }
}
