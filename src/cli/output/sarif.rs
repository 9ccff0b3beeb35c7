//! SARIF 2.1.0 output formatting for code-scanning integration

use serde::Serialize;
use std::collections::HashSet;

use super::{advisory_url, ReportFormatter};
use crate::error::{BardscanError, ReportError};
use crate::model::{Finding, ScanReport, Severity};

pub struct SarifOutput;

impl SarifOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SarifOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    #[serde(rename = "informationUri")]
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: String,
    name: String,
    #[serde(rename = "helpUri")]
    help_uri: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

fn severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium | Severity::Low => "warning",
        Severity::Unknown => "note",
    }
}

fn finding_results(finding: &Finding) -> Vec<SarifResult> {
    let uri = if finding.evidence.is_empty() {
        format!("{}@{}", finding.package_name, finding.version)
    } else {
        finding.evidence[0].clone()
    };

    finding
        .vulnerabilities
        .iter()
        .map(|vuln| SarifResult {
            rule_id: vuln.id.clone(),
            level: severity_to_level(finding.severity).to_string(),
            message: SarifMessage {
                text: format!(
                    "{}@{}: {}",
                    finding.package_name,
                    finding.version,
                    vuln.summary.as_deref().unwrap_or(&vuln.id)
                ),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation { uri: uri.clone() },
                },
            }],
        })
        .collect()
}

impl ReportFormatter for SarifOutput {
    fn render(&self, report: &ScanReport) -> Result<String, BardscanError> {
        let mut seen_ids = HashSet::new();
        let mut rules = Vec::new();
        let mut results = Vec::new();

        for finding in &report.findings {
            results.extend(finding_results(finding));
            for vuln in &finding.vulnerabilities {
                if seen_ids.insert(vuln.id.clone()) {
                    rules.push(SarifRule {
                        id: vuln.id.clone(),
                        name: vuln.id.clone(),
                        help_uri: advisory_url(&vuln.id),
                        short_description: SarifMessage {
                            text: vuln.summary.clone().unwrap_or_else(|| vuln.id.clone()),
                        },
                    });
                }
            }
        }

        let sarif = SarifReport {
            schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            version: "2.1.0",
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "bardcheck/bardscan",
                        version: env!("CARGO_PKG_VERSION"),
                        information_uri: "https://github.com/bardcheck/bardscan",
                        rules,
                    },
                },
                results,
            }],
        };

        serde_json::to_string_pretty(&sarif).map_err(|e| BardscanError::Report(ReportError::from(e)))
    }
}
