//! # Data Model
//!
//! Shared types produced by the lockfile resolver, the evidence indexer and the
//! OSV client, and consumed by the scan orchestrator and the report formatters.
//!
//! The severity/confidence/provenance types are kept separate from the
//! collaborators that produce them so the orchestrator ([`crate::orchestrator`])
//! can reason about a finding without depending on how its data was sourced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single dependency resolved from a lockfile.
///
/// Identity is `(name, version)`. A dependency that appears both as a direct
/// and a transitive entry in the same lockfile collapses to one node with
/// `direct = true`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DependencyNode {
    pub name: String,
    pub version: String,
    pub direct: bool,
}

impl DependencyNode {
    pub fn new(name: impl Into<String>, version: impl Into<String>, direct: bool) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            direct,
        }
    }

    pub fn key(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// The dependency set resolved from a single lockfile, keyed by `name@version`.
#[derive(Debug, Clone, Default)]
pub struct ParsedLock {
    pub dialect: LockfileDialect,
    nodes: BTreeMap<String, DependencyNode>,
}

impl ParsedLock {
    pub fn new(dialect: LockfileDialect) -> Self {
        Self {
            dialect,
            nodes: BTreeMap::new(),
        }
    }

    /// Insert a dependency, merging with any existing entry for the same key.
    /// `direct` is sticky: once true for a key, it stays true.
    pub fn insert(&mut self, node: DependencyNode) {
        let key = node.key();
        self.nodes
            .entry(key)
            .and_modify(|existing| existing.direct = existing.direct || node.direct)
            .or_insert(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }
}

/// Which of the four supported lockfile dialects produced a [`ParsedLock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockfileDialect {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl LockfileDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockfileDialect::Npm => "npm",
            LockfileDialect::Pnpm => "pnpm",
            LockfileDialect::Yarn => "yarn",
            LockfileDialect::Bun => "bun",
        }
    }
}

/// The package -> evidence-file-paths map built by the evidence indexer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceIndex {
    pub scanned_files: usize,
    pub by_package: BTreeMap<String, Vec<String>>,
}

impl EvidenceIndex {
    pub fn paths_for(&self, package: &str) -> &[String] {
        self.by_package
            .get(package)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_evidence(&self, package: &str) -> bool {
        !self.paths_for(package).is_empty()
    }
}

/// Severity levels for a finding or an individual advisory, in ascending order
/// of how seriously they should be treated by `--fail-on` thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Rank used for both sorting (highest first) and fail-on comparisons.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
            Severity::Unknown => 0,
        }
    }

    pub fn from_cvss_score(score: f64) -> Self {
        if score >= 9.0 {
            Severity::Critical
        } else if score >= 7.0 {
            Severity::High
        } else if score >= 4.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Map a free-text database-specific severity label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.to_lowercase();
        if lower.contains("critical") {
            Some(Severity::Critical)
        } else if lower.contains("high") {
            Some(Severity::High)
        } else if lower.contains("medium") || lower.contains("moderate") {
            Some(Severity::Medium)
        } else if lower.contains("low") {
            Some(Severity::Low)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Unknown => "unknown",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "unknown" => Some(Severity::Unknown),
            "none" => None,
            _ => None,
        }
    }
}

/// The `--fail-on` threshold. Distinct from [`Severity`] because it adds a
/// `None` option ("never fail") that is not a valid severity for a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailOnThreshold {
    Critical,
    High,
    Medium,
    Low,
    None,
}

impl FailOnThreshold {
    /// Lowest [`Severity`] rank that meets this threshold, or `None` if the
    /// threshold can never be met.
    pub fn min_rank(&self) -> Option<u8> {
        match self {
            FailOnThreshold::Critical => Some(Severity::Critical.rank()),
            FailOnThreshold::High => Some(Severity::High.rank()),
            FailOnThreshold::Medium => Some(Severity::Medium.rank()),
            FailOnThreshold::Low => Some(Severity::Low.rank()),
            FailOnThreshold::None => None,
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" => Some(FailOnThreshold::Critical),
            "high" => Some(FailOnThreshold::High),
            "medium" => Some(FailOnThreshold::Medium),
            "low" => Some(FailOnThreshold::Low),
            "none" => Some(FailOnThreshold::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailOnThreshold::Critical => "critical",
            FailOnThreshold::High => "high",
            FailOnThreshold::Medium => "medium",
            FailOnThreshold::Low => "low",
            FailOnThreshold::None => "none",
        }
    }
}

/// How much a finding's classification can be trusted, derived from whether
/// the dependency is direct and whether import evidence was found for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    Unknown,
}

impl Confidence {
    pub fn derive(direct: bool, has_evidence: bool) -> Self {
        match (direct, has_evidence) {
            (true, true) => Confidence::High,
            (true, false) => Confidence::Medium,
            (false, true) => Confidence::Low,
            (false, false) => Confidence::Unknown,
        }
    }
}

/// Provenance tag recording which enrichment step produced a severity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeveritySource {
    OsvCvss,
    OsvLabel,
    OsvDetailCvss,
    OsvDetailLabel,
    AliasCvss,
    GhsaCvss,
    GhsaLabel,
    PolicyOverride,
    Unknown,
}

/// Why a finding's severity could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownReason {
    MissingScore,
    LookupFailed,
}

/// Where the data behind a [`Finding`] ultimately came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Osv,
    Cache,
    Unknown,
}

/// A single advisory matched against a `(name, version)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub severity: Severity,
    pub severity_source: SeveritySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_reason: Option<UnknownReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_version: Option<String>,
}

/// One row of the final report: a dependency with at least one matched
/// vulnerability, or an unresolved lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub package_name: String,
    pub version: String,
    pub direct: bool,
    pub severity: Severity,
    pub severity_source: SeveritySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_reason: Option<UnknownReason>,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub source: Source,
}

/// Per-severity / per-confidence counts plus totals, embedded in [`ScanReport`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unknown: usize,
}

impl SeverityCounts {
    pub fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.unknown
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unknown: usize,
}

impl ConfidenceCounts {
    pub fn bump(&mut self, confidence: Confidence) {
        match confidence {
            Confidence::High => self.high += 1,
            Confidence::Medium => self.medium += 1,
            Confidence::Low => self.low += 1,
            Confidence::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.unknown
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub dependency_count: usize,
    pub scanned_files: usize,
    pub findings_count: usize,
    pub by_severity: SeverityCounts,
    pub by_confidence: ConfidenceCounts,
}

/// The full, deterministic scan output. Serialized as-is for `--format json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub target_path: String,
    pub generated_at: String,
    pub fail_on: FailOnThreshold,
    pub summary: ScanSummary,
    pub findings: Vec<Finding>,
}

impl ScanReport {
    /// Whether any finding's severity meets or exceeds `fail_on`.
    pub fn threshold_hit(&self) -> bool {
        match self.fail_on.min_rank() {
            None => false,
            Some(min_rank) => self.findings.iter().any(|f| f.severity.rank() >= min_rank),
        }
    }

    pub fn unknown_hit(&self) -> bool {
        self.findings.iter().any(|f| f.unknown_reason.is_some())
    }
}
