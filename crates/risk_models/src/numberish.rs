//! Serde adapters for numberish document fields.
//!
//! Analysts write `"1 000"`, `"50%"` or plain numbers interchangeably;
//! these `deserialize_with` helpers route string values through
//! [`risk_core::numeric::parse_numberish`] so the rest of the crate only
//! ever sees `f64`.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};

use risk_core::numeric::parse_numberish;

/// A raw document value that may be a number or a numberish string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Num(f64),
    Str(String),
}

impl Raw {
    fn into_f64<E: DeError>(self) -> Result<f64, E> {
        match self {
            Raw::Num(n) => Ok(n),
            Raw::Str(s) => parse_numberish(&s).map_err(E::custom),
        }
    }
}

/// Deserializes an optional numberish field into `Option<f64>`.
///
/// Use together with `#[serde(default)]` so absent fields become `None`.
pub fn opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => raw.into_f64().map(Some),
    }
}

/// Deserializes a required numberish field into `f64`.
pub fn required<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Raw::deserialize(deserializer)?.into_f64()
}

/// Deserializes an optional list of numberish values.
pub fn opt_vec<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Vec<Raw>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raws) => raws
            .into_iter()
            .map(Raw::into_f64)
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
    }
}

/// Deserializes a numberish exposure count into `u64` (rounded).
pub fn cardinality<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Raw::deserialize(deserializer)?.into_f64::<D::Error>()?;
    if value < 0.0 || !value.is_finite() {
        return Err(D::Error::custom(format!(
            "cardinality must be a non-negative integer, got {value}"
        )));
    }
    Ok(value.round() as u64)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::opt")]
        lambda: Option<f64>,
        #[serde(default, deserialize_with = "super::opt_vec")]
        losses: Option<Vec<f64>>,
    }

    #[test]
    fn test_opt_accepts_number_and_string() {
        let p: Probe = serde_json::from_str(r#"{"lambda": 2.5}"#).unwrap();
        assert_eq!(p.lambda, Some(2.5));

        let p: Probe = serde_json::from_str(r#"{"lambda": "1 000"}"#).unwrap();
        assert_eq!(p.lambda, Some(1000.0));

        let p: Probe = serde_json::from_str(r#"{"lambda": "15%"}"#).unwrap();
        assert_eq!(p.lambda, Some(0.15));
    }

    #[test]
    fn test_opt_missing_is_none() {
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(p.lambda, None);
    }

    #[test]
    fn test_opt_vec_mixed() {
        let p: Probe = serde_json::from_str(r#"{"losses": [100, "2 000", "3,500"]}"#).unwrap();
        assert_eq!(p.losses, Some(vec![100.0, 2000.0, 3500.0]));
    }

    #[test]
    fn test_opt_rejects_garbage() {
        let r: Result<Probe, _> = serde_json::from_str(r#"{"lambda": "abc"}"#);
        assert!(r.is_err());
    }
}
