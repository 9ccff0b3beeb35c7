//! Output formatting module for CLI

pub mod json;
mod markdown;
mod sarif;
mod terminal;

pub use json::JsonOutput;
pub use markdown::MarkdownOutput;
pub use sarif::SarifOutput;
pub use terminal::print_summary;

use crate::error::BardscanError;
use crate::model::ScanReport;

/// Trait for rendering a full [`ScanReport`] to a report file's contents.
pub trait ReportFormatter {
    fn render(&self, report: &ScanReport) -> Result<String, BardscanError>;
}

/// Map an advisory id to its canonical detail page, per the GHSA/CVE/OSV
/// prefix convention.
pub fn advisory_url(id: &str) -> String {
    if let Some(rest) = id.strip_prefix("GHSA-") {
        format!("https://github.com/advisories/GHSA-{}", rest)
    } else if id.starts_with("CVE-") {
        format!("https://nvd.nist.gov/vuln/detail/{}", id)
    } else {
        format!("https://osv.dev/vulnerability/{}", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisory_url_routes_by_prefix() {
        assert_eq!(
            advisory_url("GHSA-aaaa-bbbb-cccc"),
            "https://github.com/advisories/GHSA-aaaa-bbbb-cccc"
        );
        assert_eq!(
            advisory_url("CVE-2024-9999"),
            "https://nvd.nist.gov/vuln/detail/CVE-2024-9999"
        );
        assert_eq!(
            advisory_url("OSV-2024-1"),
            "https://osv.dev/vulnerability/OSV-2024-1"
        );
    }
}
