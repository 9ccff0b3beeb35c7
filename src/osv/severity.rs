//! Severity normalization shared by the initial OSV-batch pass and the
//! OSV-detail enrichment step. See SPEC §4.4 for the score-band table and
//! the `<context>_cvss` / `<context>_label` source-tag convention.

use super::types::RawOsvVuln;
use crate::model::{Severity, SeveritySource, UnknownReason, Vulnerability};

/// Normalize a raw OSV vulnerability document into a [`Vulnerability`],
/// tagging the severity source with `<context>_cvss` / `<context>_label`.
pub fn normalize_severity(raw: &RawOsvVuln, context: &str) -> Vulnerability {
    let (severity, source, unknown_reason) = match resolve_tagged(raw, context) {
        Some((severity, source)) => (severity, source, None),
        None => (
            Severity::Unknown,
            SeveritySource::Unknown,
            Some(UnknownReason::MissingScore),
        ),
    };

    Vulnerability {
        id: raw.id.clone(),
        summary: raw.summary.clone(),
        aliases: raw.aliases.clone(),
        severity,
        severity_source: source,
        unknown_reason,
        modified: raw.modified.clone(),
        references: dedup_references(raw),
        fixed_version: lowest_fixed_version(raw),
    }
}

/// Resolve just the severity/source pair for a raw document, used by the
/// enrichment pass where the rest of the [`Vulnerability`] is unchanged.
pub fn resolve(raw: &RawOsvVuln, context: &str) -> Option<(Severity, SeveritySource)> {
    resolve_tagged(raw, context)
}

fn resolve_tagged(raw: &RawOsvVuln, context: &str) -> Option<(Severity, SeveritySource)> {
    for entry in &raw.severity {
        if entry.severity_type.to_lowercase().contains("cvss") {
            if let Some(score) = parse_cvss_score(&entry.score) {
                return Some((
                    Severity::from_cvss_score(score),
                    cvss_source_tag(context),
                ));
            }
        }
    }

    if let Some(label) = raw
        .database_specific
        .as_ref()
        .and_then(|ds| ds.get("severity"))
        .and_then(|s| s.as_str())
    {
        if let Some(severity) = Severity::from_label(label) {
            return Some((severity, label_source_tag(context)));
        }
    }

    None
}

fn cvss_source_tag(context: &str) -> SeveritySource {
    match context {
        "osv" => SeveritySource::OsvCvss,
        "osv_detail" => SeveritySource::OsvDetailCvss,
        _ => SeveritySource::OsvCvss,
    }
}

fn label_source_tag(context: &str) -> SeveritySource {
    match context {
        "osv" => SeveritySource::OsvLabel,
        "osv_detail" => SeveritySource::OsvDetailLabel,
        _ => SeveritySource::OsvLabel,
    }
}

/// Parse a CVSS score string, which may be a bare number or a full vector
/// string (e.g. `CVSS:3.1/AV:N/.../I:H/A:H/9.8`) whose last `/`-separated
/// token is the numeric value.
fn parse_cvss_score(raw: &str) -> Option<f64> {
    if let Ok(score) = raw.parse::<f64>() {
        return Some(score);
    }
    raw.rsplit('/').next().and_then(|tok| tok.parse::<f64>().ok())
}

fn lowest_fixed_version(raw: &RawOsvVuln) -> Option<String> {
    raw.affected
        .iter()
        .flat_map(|affected| &affected.ranges)
        .flat_map(|range| &range.events)
        .filter_map(|event| event.fixed.clone())
        .min()
}

fn dedup_references(raw: &RawOsvVuln) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.references
        .iter()
        .filter_map(|r| r.url.clone())
        .filter(|url| !url.is_empty())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Extract the preferred CVSS base score (v3.1 → v3.0 → v2) from an NVD
/// CVE 2.0 API response body.
pub fn extract_nvd_base_score(body: &serde_json::Value) -> Option<f64> {
    let metrics = body
        .get("vulnerabilities")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.get("cve"))
        .and_then(|cve| cve.get("metrics"))?;

    for key in ["cvssMetricV31", "cvssMetricV30", "cvssMetricV2"] {
        if let Some(score) = metrics
            .get(key)
            .and_then(|arr| arr.as_array())
            .and_then(|arr| arr.first())
            .and_then(|entry| entry.get("cvssData"))
            .and_then(|data| data.get("baseScore"))
            .and_then(|s| s.as_f64())
        {
            return Some(score);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osv::types::{RawOsvAffected, RawOsvEvent, RawOsvRange, RawOsvReference, RawOsvSeverity};

    fn base_vuln() -> RawOsvVuln {
        RawOsvVuln {
            id: "GHSA-test".to_string(),
            summary: Some("a summary".to_string()),
            details: None,
            aliases: vec!["CVE-2024-1234".to_string()],
            modified: Some("2024-01-01T00:00:00Z".to_string()),
            severity: vec![],
            affected: vec![],
            references: vec![],
            database_specific: None,
        }
    }

    #[test]
    fn cvss_numeric_score_maps_to_band() {
        let mut raw = base_vuln();
        raw.severity.push(RawOsvSeverity {
            severity_type: "CVSS_V3".to_string(),
            score: "9.8".to_string(),
        });
        let vuln = normalize_severity(&raw, "osv");
        assert_eq!(vuln.severity, Severity::Critical);
        assert_eq!(vuln.severity_source, SeveritySource::OsvCvss);
    }

    #[test]
    fn cvss_vector_string_uses_last_token() {
        let mut raw = base_vuln();
        raw.severity.push(RawOsvSeverity {
            severity_type: "CVSS_V3".to_string(),
            score: "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/7.5".to_string(),
        });
        let vuln = normalize_severity(&raw, "osv");
        assert_eq!(vuln.severity, Severity::High);
    }

    #[test]
    fn falls_back_to_database_specific_label() {
        let mut raw = base_vuln();
        raw.database_specific = Some(serde_json::json!({"severity": "MODERATE"}));
        let vuln = normalize_severity(&raw, "osv");
        assert_eq!(vuln.severity, Severity::Medium);
        assert_eq!(vuln.severity_source, SeveritySource::OsvLabel);
    }

    #[test]
    fn no_score_and_no_label_is_unknown() {
        let raw = base_vuln();
        let vuln = normalize_severity(&raw, "osv");
        assert_eq!(vuln.severity, Severity::Unknown);
        assert_eq!(vuln.severity_source, SeveritySource::Unknown);
        assert_eq!(vuln.unknown_reason, Some(UnknownReason::MissingScore));
    }

    #[test]
    fn detail_context_uses_detail_tags() {
        let mut raw = base_vuln();
        raw.severity.push(RawOsvSeverity {
            severity_type: "CVSS_V3".to_string(),
            score: "9.8".to_string(),
        });
        let (_, source) = resolve(&raw, "osv_detail").unwrap();
        assert_eq!(source, SeveritySource::OsvDetailCvss);
    }

    #[test]
    fn lowest_fixed_version_is_lexicographic_min() {
        let mut raw = base_vuln();
        raw.affected.push(RawOsvAffected {
            ranges: vec![RawOsvRange {
                events: vec![
                    RawOsvEvent {
                        introduced: Some("0".to_string()),
                        fixed: Some("2.0.0".to_string()),
                    },
                    RawOsvEvent {
                        introduced: None,
                        fixed: Some("1.5.0".to_string()),
                    },
                ],
            }],
        });
        let vuln = normalize_severity(&raw, "osv");
        assert_eq!(vuln.fixed_version, Some("1.5.0".to_string()));
    }

    #[test]
    fn references_are_deduplicated_order_preserving() {
        let mut raw = base_vuln();
        raw.references = vec![
            RawOsvReference {
                url: Some("https://a".to_string()),
            },
            RawOsvReference {
                url: Some("https://b".to_string()),
            },
            RawOsvReference {
                url: Some("https://a".to_string()),
            },
        ];
        let vuln = normalize_severity(&raw, "osv");
        assert_eq!(
            vuln.references,
            vec!["https://a".to_string(), "https://b".to_string()]
        );
    }
}
