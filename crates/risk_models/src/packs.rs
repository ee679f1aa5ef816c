//! Control catalog and control assessment packs.
//!
//! Packs are shared documents referenced by portfolios:
//!
//! - a **catalog** registers the known control ids (and display titles);
//!   when any catalog is referenced, portfolio inventory ids must appear in
//!   one of them
//! - an **assessment** records measured posture per control id; it is the
//!   fallback inventory source when the portfolio itself carries no entry

use serde::{Deserialize, Serialize};

use crate::meta::Meta;
use crate::numberish;
use crate::portfolio::{ControlSurface, Coverage};

/// Top-level control catalog document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlCatalogDocument {
    pub version: String,
    #[serde(default)]
    pub meta: Meta,
    pub catalog: ControlCatalog,
}

/// Catalog body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlCatalog {
    pub controls: Vec<CatalogEntry>,
}

/// One registered control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Top-level control assessment document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlAssessmentDocument {
    pub version: String,
    #[serde(default)]
    pub meta: Meta,
    pub assessment: ControlAssessmentPack,
}

/// Assessment body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlAssessmentPack {
    pub assessments: Vec<ControlAssessment>,
}

/// Measured posture for one control.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlAssessment {
    pub id: String,
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub implementation_effectiveness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
    #[serde(default, deserialize_with = "numberish::opt", skip_serializing_if = "Option::is_none")]
    pub reliability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affects: Option<ControlSurface>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_parse() {
        let json = r#"{
            "version": "1.0",
            "catalog": {"controls": [{"id": "edr", "title": "Endpoint Detection"}, {"id": "mfa"}]}
        }"#;
        let doc: ControlCatalogDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.catalog.controls.len(), 2);
        assert_eq!(doc.catalog.controls[1].id, "mfa");
    }

    #[test]
    fn test_assessment_parse() {
        let json = r#"{
            "version": "1.0",
            "assessment": {"assessments": [
                {"id": "mfa", "implementation_effectiveness": "85%",
                 "coverage": {"value": 0.95, "basis": "employees"},
                 "reliability": 0.999, "affects": "both"}
            ]}
        }"#;
        let doc: ControlAssessmentDocument = serde_json::from_str(json).unwrap();
        let a = &doc.assessment.assessments[0];
        assert_eq!(a.implementation_effectiveness, Some(0.85));
        assert_eq!(a.affects, Some(ControlSurface::Both));
    }
}
