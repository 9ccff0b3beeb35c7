//! Markdown output formatting

use super::{advisory_url, ReportFormatter};
use crate::error::BardscanError;
use crate::model::ScanReport;

pub struct MarkdownOutput;

impl MarkdownOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownOutput {
    fn render(&self, report: &ScanReport) -> Result<String, BardscanError> {
        let mut out = String::new();

        out.push_str("# bardscan report\n\n");
        out.push_str(&format!("- Target: `{}`\n", report.target_path));
        out.push_str(&format!("- Generated: {}\n", report.generated_at));
        out.push_str(&format!(
            "- Dependencies: {}\n",
            report.summary.dependency_count
        ));
        out.push_str(&format!(
            "- Findings: {}\n\n",
            report.summary.findings_count
        ));

        for finding in &report.findings {
            out.push_str(&format!(
                "## {}@{} — {} ({:?})\n\n",
                finding.package_name,
                finding.version,
                finding.severity.as_str(),
                finding.severity_source
            ));
            out.push_str(&format!(
                "confidence: {:?}, direct: {}\n\n",
                finding.confidence, finding.direct
            ));

            for vuln in &finding.vulnerabilities {
                let summary = vuln.summary.as_deref().unwrap_or("");
                out.push_str(&format!(
                    "- [{}]({}): {}\n",
                    vuln.id,
                    advisory_url(&vuln.id),
                    summary
                ));
                if let Some(fixed) = &vuln.fixed_version {
                    out.push_str(&format!("  - fixed in: {}\n", fixed));
                }
                for reference in vuln.references.iter().take(3) {
                    out.push_str(&format!("  - {}\n", reference));
                }
            }

            if !finding.evidence.is_empty() {
                out.push_str(&format!("\nevidence: {}\n", finding.evidence.join(", ")));
            }
            out.push('\n');
        }

        Ok(out)
    }
}
