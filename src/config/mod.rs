//! # Configuration Module
//!
//! This module centralizes resolution of the CLI surface into the option
//! bundles the rest of bardscan consumes: [`ScanOptions`] for `scan` and
//! [`DbUpdateOptions`] for `db update`. There is no project-level config file
//! — CLI flags are the only configuration source — but resolution still
//! lives here, in the donor's style of keeping option structs out of `main`.
//!
//! ## Configuration Priority
//!
//! 1. Explicit CLI flags (clap reports these as present, distinguishing
//!    "not passed" from "passed, equal to the default")
//! 2. The privacy preset bundle (`--privacy strict|standard`)
//! 3. Built-in defaults
//!
//! ## Privacy Presets
//!
//! ```text
//! strict:   offline=true,  fallback_calls=false, redact_paths=true,  evidence=none
//! standard: offline=true,  fallback_calls=true,  redact_paths=false, evidence=imports
//! ```
//!
//! Requesting `--offline false` (i.e. online) while `--privacy strict` is
//! active is a [`crate::error::BardscanError::ConfigConflict`].
//!
//! ## Examples
//!
//! ```rust
//! use bardscan::config::Preset;
//!
//! let bundle = Preset::Strict.bundle();
//! assert!(bundle.offline);
//! assert!(!bundle.fallback_calls);
//! ```

use crate::error::BardscanError;
use crate::model::{FailOnThreshold, Severity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for `scan` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    #[value(name = "md", alias = "markdown")]
    Markdown,
    Sarif,
    /// JSON + Markdown
    Both,
}

impl OutputFormat {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "md" | "markdown" => Some(OutputFormat::Markdown),
            "sarif" => Some(OutputFormat::Sarif),
            "both" => Some(OutputFormat::Both),
            _ => None,
        }
    }

    pub fn writes_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    pub fn writes_markdown(&self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }

    pub fn writes_sarif(&self) -> bool {
        matches!(self, OutputFormat::Sarif)
    }
}

/// Console listing filter for `--list-findings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ListFindingsFilter {
    None,
    CriticalHigh,
    MediumUp,
    All,
}

impl ListFindingsFilter {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(ListFindingsFilter::None),
            "critical-high" => Some(ListFindingsFilter::CriticalHigh),
            "medium-up" => Some(ListFindingsFilter::MediumUp),
            "all" => Some(ListFindingsFilter::All),
            _ => None,
        }
    }

    pub fn matches(&self, severity: Severity) -> bool {
        match self {
            ListFindingsFilter::None => false,
            ListFindingsFilter::CriticalHigh => {
                matches!(severity, Severity::Critical | Severity::High)
            }
            ListFindingsFilter::MediumUp => matches!(
                severity,
                Severity::Critical | Severity::High | Severity::Medium
            ),
            ListFindingsFilter::All => true,
        }
    }
}

/// Evidence collection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceMode {
    None,
    Imports,
}

impl EvidenceMode {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(EvidenceMode::None),
            "imports" => Some(EvidenceMode::Imports),
            _ => None,
        }
    }
}

/// Named privacy preset bundle, resolved before explicit CLI flags are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Strict,
    Standard,
}

impl Preset {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Some(Preset::Strict),
            "standard" => Some(Preset::Standard),
            _ => None,
        }
    }

    /// The default bundle this preset resolves to, before CLI overrides.
    pub fn bundle(&self) -> PresetBundle {
        match self {
            Preset::Strict => PresetBundle {
                offline: true,
                fallback_calls: false,
                redact_paths: true,
                evidence: EvidenceMode::None,
            },
            Preset::Standard => PresetBundle {
                offline: true,
                fallback_calls: true,
                redact_paths: false,
                evidence: EvidenceMode::Imports,
            },
        }
    }
}

/// Default field values for a [`Preset`], before explicit overrides.
#[derive(Debug, Clone, Copy)]
pub struct PresetBundle {
    pub offline: bool,
    pub fallback_calls: bool,
    pub redact_paths: bool,
    pub evidence: EvidenceMode,
}

/// Fully-resolved options consumed by the scan orchestrator.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub target_dir: PathBuf,
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    pub fail_on: FailOnThreshold,
    pub offline: bool,
    pub unknown_as: Severity,
    pub refresh_cache: bool,
    pub list_findings: ListFindingsFilter,
    pub findings_json: Option<PathBuf>,
    pub privacy: Preset,
    pub fallback_calls: bool,
    pub redact_paths: bool,
    pub evidence: EvidenceMode,
    pub fail_on_unknown: bool,
    pub osv_url: String,
}

/// Raw, pre-resolution view of the CLI flags relevant to `scan`. A flag is
/// `Some` only when clap reports it as explicitly present, so presets can
/// tell "not passed" apart from "passed, equal to the default".
#[derive(Debug, Clone, Default)]
pub struct ScanCliOverrides {
    pub target_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub fail_on: Option<FailOnThreshold>,
    pub offline: Option<bool>,
    pub unknown_as: Option<Severity>,
    pub refresh_cache: Option<bool>,
    pub list_findings: Option<ListFindingsFilter>,
    pub findings_json: Option<PathBuf>,
    pub privacy: Option<Preset>,
    pub fallback_calls: Option<bool>,
    pub redact_paths: Option<bool>,
    pub evidence: Option<EvidenceMode>,
    pub fail_on_unknown: Option<bool>,
    pub osv_url: Option<String>,
}

impl ScanOptions {
    /// Resolve a [`ScanOptions`] bundle from CLI overrides, applying the
    /// privacy preset first and letting explicit flags win.
    pub fn resolve(overrides: ScanCliOverrides) -> Result<Self, BardscanError> {
        let privacy = overrides.privacy.unwrap_or(Preset::Strict);
        let bundle = privacy.bundle();

        let offline = overrides.offline.unwrap_or(bundle.offline);
        let fallback_calls = overrides.fallback_calls.unwrap_or(bundle.fallback_calls);

        if privacy == Preset::Strict {
            if !offline {
                return Err(BardscanError::ConfigConflict {
                    message: "--offline false is incompatible with --privacy strict".to_string(),
                });
            }
            if fallback_calls && overrides.fallback_calls == Some(true) {
                return Err(BardscanError::ConfigConflict {
                    message: "--fallback-calls true is incompatible with --privacy strict"
                        .to_string(),
                });
            }
        }

        Ok(ScanOptions {
            target_dir: overrides.target_dir.unwrap_or_else(|| PathBuf::from(".")),
            out_dir: overrides
                .out_dir
                .unwrap_or_else(|| PathBuf::from("./.bardcheck")),
            format: overrides.format.unwrap_or(OutputFormat::Both),
            fail_on: overrides.fail_on.unwrap_or(FailOnThreshold::High),
            offline,
            unknown_as: overrides.unknown_as.unwrap_or(Severity::Unknown),
            refresh_cache: overrides.refresh_cache.unwrap_or(false),
            list_findings: overrides.list_findings.unwrap_or(ListFindingsFilter::None),
            findings_json: overrides.findings_json,
            privacy,
            fallback_calls,
            redact_paths: overrides.redact_paths.unwrap_or(bundle.redact_paths),
            evidence: overrides.evidence.unwrap_or(bundle.evidence),
            fail_on_unknown: overrides.fail_on_unknown.unwrap_or(false),
            osv_url: overrides
                .osv_url
                .unwrap_or_else(|| "https://api.osv.dev".to_string()),
        })
    }
}

/// Options for the `db update` verb: proactively warms the advisory cache
/// for a package set without producing a report.
#[derive(Debug, Clone)]
pub struct DbUpdateOptions {
    pub target_dir: PathBuf,
    pub out_dir: PathBuf,
    pub refresh_cache: bool,
    pub osv_url: String,
}
