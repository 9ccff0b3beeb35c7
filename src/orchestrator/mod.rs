//! # Scan Orchestrator
//!
//! Joins the dependency set, the evidence index, and advisory lookups into a
//! deterministic, stably-ordered [`ScanReport`]. Never aborts for advisory
//! availability issues — only configuration and local I/O errors abort a
//! run; every dependency lookup failure instead becomes an `unknown`
//! finding.

use crate::cache::AdvisoryCache;
use crate::config::{EvidenceMode, ScanOptions};
use crate::error::{BardscanError, CacheError};
use crate::evidence;
use crate::lockfile;
use crate::model::{
    Confidence, EvidenceIndex, Finding, ParsedLock, ScanReport, ScanSummary, Severity,
    SeveritySource, Source, UnknownReason,
};
use crate::osv::OsvClient;
use std::sync::Arc;

/// Run a full `scan`: parse the lockfile, collect evidence, resolve
/// advisories, synthesize and sort findings, and compute summaries.
pub async fn run_scan(options: &ScanOptions) -> Result<ScanReport, BardscanError> {
    std::fs::create_dir_all(&options.out_dir).map_err(|e| {
        BardscanError::Cache(CacheError::OutDirUnwritable {
            path: options.out_dir.display().to_string(),
            source: e,
        })
    })?;

    let parsed_lock = lockfile::resolve(&options.target_dir)?;

    let evidence_index = match options.evidence {
        EvidenceMode::None => EvidenceIndex::default(),
        EvidenceMode::Imports => evidence::build_index(&options.target_dir),
    };

    let cache = Arc::new(AdvisoryCache::new(&options.out_dir, options.refresh_cache)?);
    let client = OsvClient::new(
        cache,
        options.osv_url.clone(),
        options.offline,
        options.fallback_calls,
    );

    let packages: Vec<(String, String)> = parsed_lock
        .iter()
        .map(|n| (n.name.clone(), n.version.clone()))
        .collect();
    let lookups = client.batch_query(&packages).await;

    let mut findings = Vec::new();
    for (index, node) in parsed_lock.iter().enumerate() {
        let key = node.key();
        let lookup = lookups.get(&key);
        let evidence_paths = evidence_index.paths_for(&node.name).to_vec();
        let has_evidence = !evidence_paths.is_empty();
        let confidence = Confidence::derive(node.direct, has_evidence);

        let finding = match lookup {
            None => Some(unknown_finding(node, evidence_paths, confidence)),
            Some(result) if result.source == Source::Unknown => {
                Some(unknown_finding(node, evidence_paths, confidence))
            }
            Some(result) if result.vulnerabilities.is_empty() => None,
            Some(result) => Some(build_finding(node, result, evidence_paths, confidence)),
        };

        if let Some(mut finding) = finding {
            apply_unknown_as(&mut finding, options.unknown_as);
            findings.push((index, finding));
        }
    }

    sort_findings(&mut findings);
    let findings: Vec<Finding> = findings.into_iter().map(|(_, f)| f).collect();

    let summary = summarize(&parsed_lock, &evidence_index, &findings);

    Ok(ScanReport {
        target_path: options.target_dir.display().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        fail_on: options.fail_on,
        summary,
        findings,
    })
}

fn unknown_finding(
    node: &crate::model::DependencyNode,
    evidence: Vec<String>,
    confidence: Confidence,
) -> Finding {
    Finding {
        package_name: node.name.clone(),
        version: node.version.clone(),
        direct: node.direct,
        severity: Severity::Unknown,
        severity_source: SeveritySource::Unknown,
        unknown_reason: Some(UnknownReason::LookupFailed),
        confidence,
        evidence,
        vulnerabilities: Vec::new(),
        source: Source::Unknown,
    }
}

fn build_finding(
    node: &crate::model::DependencyNode,
    result: &crate::osv::LookupResult,
    evidence: Vec<String>,
    confidence: Confidence,
) -> Finding {
    let worst = result
        .vulnerabilities
        .iter()
        .enumerate()
        .max_by_key(|(i, v)| (v.severity.rank(), std::cmp::Reverse(*i)))
        .map(|(_, v)| v)
        .expect("non-empty vulnerabilities");

    Finding {
        package_name: node.name.clone(),
        version: node.version.clone(),
        direct: node.direct,
        severity: worst.severity,
        severity_source: worst.severity_source,
        unknown_reason: worst.unknown_reason,
        confidence,
        evidence,
        vulnerabilities: result.vulnerabilities.clone(),
        source: result.source,
    }
}

fn apply_unknown_as(finding: &mut Finding, unknown_as: Severity) {
    if finding.severity == Severity::Unknown && unknown_as != Severity::Unknown {
        finding.severity = unknown_as;
        finding.severity_source = SeveritySource::PolicyOverride;
    }
}

/// Sort by `"<9 − severityRank>:<name>:<version>:<comma-joined ids>"`,
/// stable on original index.
fn sort_findings(findings: &mut [(usize, Finding)]) {
    findings.sort_by(|(ia, a), (ib, b)| {
        let key_a = ordering_key(a);
        let key_b = ordering_key(b);
        key_a.cmp(&key_b).then(ia.cmp(ib))
    });
}

fn ordering_key(finding: &Finding) -> String {
    let ids: Vec<&str> = finding
        .vulnerabilities
        .iter()
        .map(|v| v.id.as_str())
        .collect();
    format!(
        "{}:{}:{}:{}",
        9 - finding.severity.rank(),
        finding.package_name,
        finding.version,
        ids.join(",")
    )
}

fn summarize(
    parsed_lock: &ParsedLock,
    evidence_index: &EvidenceIndex,
    findings: &[Finding],
) -> ScanSummary {
    let mut by_severity = crate::model::SeverityCounts::default();
    let mut by_confidence = crate::model::ConfidenceCounts::default();
    for finding in findings {
        by_severity.bump(finding.severity);
        by_confidence.bump(finding.confidence);
    }

    ScanSummary {
        dependency_count: parsed_lock.len(),
        scanned_files: evidence_index.scanned_files,
        findings_count: findings.len(),
        by_severity,
        by_confidence,
    }
}

/// Options for the `db update` verb: warms the advisory cache for every
/// dependency in the target's lockfile without producing a report.
pub struct DbUpdateSummary {
    pub dialect: crate::model::LockfileDialect,
    pub warmed: usize,
    pub writes: usize,
    pub failures: usize,
}

pub async fn run_db_update(
    options: &crate::config::DbUpdateOptions,
) -> Result<DbUpdateSummary, BardscanError> {
    std::fs::create_dir_all(&options.out_dir).map_err(|e| {
        BardscanError::Cache(CacheError::OutDirUnwritable {
            path: options.out_dir.display().to_string(),
            source: e,
        })
    })?;

    let parsed_lock = lockfile::resolve(&options.target_dir)?;
    let cache = Arc::new(AdvisoryCache::new(&options.out_dir, options.refresh_cache)?);
    let client = OsvClient::new(cache.clone(), options.osv_url.clone(), false, false);

    let packages: Vec<(String, String)> = parsed_lock
        .iter()
        .map(|n| (n.name.clone(), n.version.clone()))
        .collect();
    let total = packages.len();
    let lookups = client.batch_query(&packages).await;
    let failures = lookups
        .values()
        .filter(|r| r.source == Source::Unknown)
        .count();

    Ok(DbUpdateSummary {
        dialect: parsed_lock.dialect,
        warmed: total.saturating_sub(failures),
        writes: cache.write_count(),
        failures,
    })
}
