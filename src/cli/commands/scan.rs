//! The `scan` command: resolve the project's lockfile, match advisories
//! against OSV, and emit JSON/Markdown/SARIF reports plus a terminal summary.

use clap::Args;
use std::path::PathBuf;

use crate::cli::exit_codes;
use crate::cli::output::{self, JsonOutput, MarkdownOutput, ReportFormatter, SarifOutput};
use crate::config::{EvidenceMode, ListFindingsFilter, OutputFormat, Preset, ScanCliOverrides, ScanOptions};
use crate::error::{BardscanError, ReportError};
use crate::model::{FailOnThreshold, Severity};
use crate::orchestrator;

/// Arguments for the `scan` command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Output format: json, md, sarif, or both (json + md)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Report + cache output directory
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Minimum severity that triggers exit code 1
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnThreshold>,

    /// Restrict advisory lookups to the cache; missing entries become unknown
    #[arg(long, value_name = "BOOL")]
    pub offline: Option<bool>,

    /// Re-classify findings whose severity could not be resolved
    #[arg(long, value_name = "SEVERITY")]
    pub unknown_as: Option<Severity>,

    /// Ignore cache reads and re-fetch every advisory
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub refresh_cache: bool,

    /// Console listing filter
    #[arg(long, value_name = "FILTER")]
    pub list_findings: Option<ListFindingsFilter>,

    /// Write the filtered findings list as JSON to this path
    #[arg(long, value_name = "FILE")]
    pub findings_json: Option<PathBuf>,

    /// Privacy preset bundle
    #[arg(long, value_name = "PRESET")]
    pub privacy: Option<Preset>,

    /// Enable the OSV-detail / NVD / GHSA enrichment chain
    #[arg(long, value_name = "BOOL")]
    pub fallback_calls: Option<bool>,

    /// Strip target/evidence paths from reports and the terminal summary
    #[arg(long, value_name = "BOOL")]
    pub redact_paths: Option<bool>,

    /// Evidence collection mode
    #[arg(long, value_name = "MODE")]
    pub evidence: Option<EvidenceMode>,

    /// Also exit 1 if any finding has an unresolved severity
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub fail_on_unknown: bool,

    /// Override the OSV-compatible advisory API base URL
    #[arg(long, value_name = "URL")]
    pub osv_url: Option<String>,
}

impl ScanArgs {
    fn overrides(&self, target_dir: PathBuf) -> ScanCliOverrides {
        ScanCliOverrides {
            target_dir: Some(target_dir),
            out_dir: self.out_dir.clone(),
            format: self.format,
            fail_on: self.fail_on,
            offline: self.offline,
            unknown_as: self.unknown_as,
            refresh_cache: Some(self.refresh_cache),
            list_findings: self.list_findings,
            findings_json: self.findings_json.clone(),
            privacy: self.privacy,
            fallback_calls: self.fallback_calls,
            redact_paths: self.redact_paths,
            evidence: self.evidence,
            fail_on_unknown: Some(self.fail_on_unknown),
            osv_url: self.osv_url.clone(),
        }
    }

    pub async fn execute(&self, directory: Option<PathBuf>) -> Result<i32, BardscanError> {
        let target_dir = directory.unwrap_or_else(|| PathBuf::from("."));
        let options = ScanOptions::resolve(self.overrides(target_dir))?;

        let report = orchestrator::run_scan(&options).await?;

        if options.format.writes_json() {
            write_report(&options.out_dir.join("report.json"), &JsonOutput::new(), &report)?;
        }
        if options.format.writes_markdown() {
            write_report(&options.out_dir.join("report.md"), &MarkdownOutput::new(), &report)?;
        }
        if options.format.writes_sarif() {
            write_report(&options.out_dir.join("report.sarif"), &SarifOutput::new(), &report)?;
        }

        if let Some(path) = &options.findings_json {
            let filtered: Vec<_> = report
                .findings
                .iter()
                .filter(|f| options.list_findings.matches(f.severity))
                .collect();
            let content = serde_json::to_string_pretty(&filtered)
                .map_err(|e| BardscanError::Report(ReportError::from(e)))?;
            std::fs::write(path, content).map_err(|e| {
                BardscanError::Report(ReportError::WriteFailed {
                    path: path.display().to_string(),
                    source: e,
                })
            })?;
        }

        if !matches!(options.list_findings, ListFindingsFilter::None) {
            for finding in report
                .findings
                .iter()
                .filter(|f| options.list_findings.matches(f.severity))
            {
                println!(
                    "  {}@{} [{}]",
                    finding.package_name,
                    finding.version,
                    finding.severity.as_str()
                );
            }
        }

        output::print_summary(&report, options.redact_paths);

        let threshold_hit = report.threshold_hit()
            || (options.fail_on_unknown && report.unknown_hit());
        Ok(if threshold_hit {
            exit_codes::THRESHOLD_HIT
        } else {
            exit_codes::SUCCESS
        })
    }
}

fn write_report(
    path: &PathBuf,
    formatter: &dyn ReportFormatter,
    report: &crate::model::ScanReport,
) -> Result<(), BardscanError> {
    let content = formatter.render(report)?;
    std::fs::write(path, content).map_err(|e| {
        BardscanError::Report(ReportError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        })
    })?;
    Ok(())
}
