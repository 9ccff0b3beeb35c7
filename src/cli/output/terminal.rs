//! Terminal summary printer. Pure output: never affects `ScanReport`
//! contents or the process exit code.

use colored::Colorize;
use console::Term;

use crate::model::ScanReport;

/// Print the post-scan summary to stdout, per the layout:
///
/// ```text
/// Scan complete: <dependencyCount> dependencies, <scannedFiles> files indexed
///   critical: N   high: N   medium: N   low: N   unknown: N
///   confidence  high: N   medium: N   low: N   unknown: N
/// threshold hit (--fail-on <level>): yes|no
/// unknown hit: yes|no
/// ```
pub fn print_summary(report: &ScanReport, redact_paths: bool) {
    let term = Term::stdout();
    let width = term.size().1 as usize;
    let _ = width; // width-aware wrapping is a no-op for this fixed-width layout

    let target = if redact_paths {
        "<redacted>".to_string()
    } else {
        report.target_path.clone()
    };

    println!(
        "Scan complete: {} dependencies, {} files indexed ({})",
        report.summary.dependency_count.to_string().bold(),
        report.summary.scanned_files.to_string().bold(),
        target.dimmed()
    );

    let by_sev = &report.summary.by_severity;
    println!(
        "  critical: {}   high: {}   medium: {}   low: {}   unknown: {}",
        by_sev.critical.to_string().red().bold(),
        by_sev.high.to_string().yellow().bold(),
        by_sev.medium.to_string().yellow(),
        by_sev.low.to_string().cyan(),
        by_sev.unknown.to_string().dimmed()
    );

    let by_conf = &report.summary.by_confidence;
    println!(
        "  confidence  high: {}   medium: {}   low: {}   unknown: {}",
        by_conf.high, by_conf.medium, by_conf.low, by_conf.unknown
    );

    println!(
        "threshold hit (--fail-on {}): {}",
        report.fail_on.as_str(),
        yes_no(report.threshold_hit())
    );
    println!("unknown hit: {}", yes_no(report.unknown_hit()));
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value {
        "yes".red().bold()
    } else {
        "no".green()
    }
}
