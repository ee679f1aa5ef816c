//! Shared document metadata block.

use serde::{Deserialize, Serialize};

/// Metadata attached to every risk document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Human-readable document name.
    pub name: Option<String>,
    /// Free-form document version string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}
