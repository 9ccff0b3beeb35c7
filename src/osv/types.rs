//! Wire types for the OSV batch/detail APIs and the cached enrichment
//! lookups (NVD score, GHSA outcome).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct OsvBatchResponse {
    #[serde(default)]
    pub results: Vec<OsvBatchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsvBatchResult {
    #[serde(default)]
    pub vulns: Option<Vec<RawOsvVuln>>,
}

/// A raw vulnerability document as returned by OSV, either embedded in a
/// batch response or fetched in full via the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOsvVuln {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub severity: Vec<RawOsvSeverity>,
    #[serde(default)]
    pub affected: Vec<RawOsvAffected>,
    #[serde(default)]
    pub references: Vec<RawOsvReference>,
    #[serde(default)]
    pub database_specific: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOsvSeverity {
    #[serde(rename = "type")]
    pub severity_type: String,
    pub score: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOsvAffected {
    #[serde(default)]
    pub ranges: Vec<RawOsvRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOsvRange {
    #[serde(default)]
    pub events: Vec<RawOsvEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOsvEvent {
    #[serde(default)]
    pub introduced: Option<String>,
    #[serde(default)]
    pub fixed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOsvReference {
    #[serde(default)]
    pub url: Option<String>,
}

/// Cached NVD CVSS base score lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvdScore {
    pub score: Option<f64>,
}

/// Cached GHSA severity lookup outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhsaOutcome {
    pub severity: Option<crate::model::Severity>,
    pub severity_source: crate::model::SeveritySource,
}
