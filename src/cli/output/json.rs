//! JSON output formatting

use super::ReportFormatter;
use crate::error::{BardscanError, ReportError};
use crate::model::ScanReport;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonOutput {
    fn render(&self, report: &ScanReport) -> Result<String, BardscanError> {
        serde_json::to_string_pretty(report)
            .map_err(|e| BardscanError::Report(ReportError::from(e)))
    }
}
