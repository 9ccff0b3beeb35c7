//! # bardscan
//!
//! bardscan is a CLI tool that scans an npm project's lockfile for known
//! dependency vulnerabilities against an OSV-compatible advisory database,
//! and emits JSON, Markdown, and SARIF reports.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bardscan::config::{ScanCliOverrides, ScanOptions};
//! use bardscan::orchestrator;
//!
//! # async fn example() -> Result<(), bardscan::BardscanError> {
//! let options = ScanOptions::resolve(ScanCliOverrides::default())?;
//! let report = orchestrator::run_scan(&options).await?;
//! println!("Found {} findings", report.findings.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`lockfile`] - npm/pnpm/yarn/bun lockfile dialect detection and parsing
//! - [`evidence`] - source-import evidence indexing
//! - [`cache`] - content-addressed on-disk advisory cache
//! - [`osv`] - OSV batch client and the OSV-detail/NVD/GHSA fallback chain
//! - [`orchestrator`] - joins the above into a `ScanReport`
//! - [`model`] - shared data model
//! - [`config`] - CLI-surface option resolution (privacy presets, `ScanOptions`)
//! - [`cli`] - command-line interface and report formatters
//! - [`error`] - error types and handling
//!
//! ## Privacy Presets
//!
//! bardscan ships two built-in presets:
//!
//! - **strict** (default) - offline, no fallback network calls, redacted paths, no evidence collection
//! - **standard** - offline by default but allows online overrides, fallback calls enabled, import evidence collected

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod evidence;
pub mod lockfile;
pub mod model;
pub mod orchestrator;
pub mod osv;

pub use error::BardscanError;

// Re-export exit_codes from the cli module for public API
pub use cli::exit_codes;
