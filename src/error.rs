//! # Error Types for bardscan
//!
//! This module defines the top-level error hierarchy using `thiserror`. Only
//! the abort-worthy failures described in the error handling design live
//! here — network, cache and per-file evidence failures are intentionally
//! absorbed into [`crate::model::UnknownReason`] / `source: unknown` data and
//! never constructed as a [`BardscanError`].
//!
//! ## Error Hierarchy
//!
//! [`BardscanError`] wraps four subsystem error types:
//!
//! - [`LockfileError`] - dialect detection and parsing failures
//! - [`CacheError`] - unwritable cache/output directories
//! - [`OsvError`] - configuration errors affecting the advisory client
//! - [`ReportError`] - report file write failures
//!
//! ## Examples
//!
//! ```rust
//! use bardscan::error::{BardscanError, LockfileError};
//!
//! let err = BardscanError::Lockfile(LockfileError::NoLockfile {
//!     dir: ".".to_string(),
//! });
//!
//! if let Some(suggestion) = err.suggestion() {
//!     assert!(suggestion.contains("npm install"));
//! }
//! ```

use colored::Colorize;
use thiserror::Error;

/// Top-level error type for bardscan. Every variant here surfaces as exit
/// code 2 with a single-line message on stderr.
#[derive(Error, Debug)]
pub enum BardscanError {
    /// Lockfile detection/parsing errors
    #[error("{0}")]
    Lockfile(#[from] LockfileError),

    /// Output/cache directory errors
    #[error("{0}")]
    Cache(#[from] CacheError),

    /// Advisory client configuration errors
    #[error("{0}")]
    Osv(#[from] OsvError),

    /// Report serialization/write errors
    #[error("{0}")]
    Report(#[from] ReportError),

    /// Conflicting CLI options
    #[error("Configuration conflict: {message}")]
    ConfigConflict {
        /// What conflicted
        message: String,
    },
}

impl BardscanError {
    /// Get a user-friendly suggestion for how to fix this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            BardscanError::Lockfile(LockfileError::NoLockfile { .. }) => Some(
                "Run 'npm install' (or the equivalent for pnpm/yarn/bun) to generate a lockfile."
                    .to_string(),
            ),
            BardscanError::Lockfile(LockfileError::Corrupt { .. }) => {
                Some("Check the lockfile for syntax errors or regenerate it.".to_string())
            }
            BardscanError::Cache(CacheError::OutDirUnwritable { path, .. }) => Some(format!(
                "Check that you have write permissions for '{}'.",
                path
            )),
            BardscanError::Report(ReportError::WriteFailed { path, .. }) => Some(format!(
                "Check that '{}' is writable and the disk has space.",
                path
            )),
            BardscanError::ConfigConflict { .. } => Some(
                "Privacy preset 'strict' requires offline mode and disabled fallback calls; drop --privacy strict or stop overriding it."
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// Format the error for display with colors and an optional hint line.
    pub fn display_formatted(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} {}\n", "Error:".red().bold(), self));
        if let Some(suggestion) = self.suggestion() {
            output.push_str(&format!("\n  {} {}\n", "Hint:".cyan().bold(), suggestion));
        }
        output
    }
}

/// Errors from dialect detection and lockfile parsing.
#[derive(Error, Debug)]
pub enum LockfileError {
    /// No recognized lockfile present in the target directory.
    #[error("No lockfile found in '{dir}' (expected package-lock.json, pnpm-lock.yaml, yarn.lock, bun.lock or bun.lockb)")]
    NoLockfile {
        /// Directory that was searched
        dir: String,
    },

    /// The lockfile exists but failed to parse.
    #[error("Failed to parse {dialect} lockfile '{path}': {detail}")]
    Corrupt {
        /// Dialect name, e.g. "npm"
        dialect: String,
        /// Path to the lockfile
        path: String,
        /// Parser error detail
        detail: String,
    },
}

/// Errors touching the output/cache directory.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The output directory (and therefore the cache root) could not be created or written to.
    #[error("Output directory '{path}' is not writable: {source}")]
    OutDirUnwritable {
        /// Path to the output directory
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },
}

/// Errors affecting the advisory client's configuration. Network and
/// per-lookup failures are NOT represented here; see module docs.
#[derive(Error, Debug)]
pub enum OsvError {
    /// The configured OSV base URL could not be parsed.
    #[error("Invalid OSV base URL '{url}': {detail}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parse error detail
        detail: String,
    },
}

/// Errors writing report files.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Failed to write a report file.
    #[error("Failed to write report '{path}': {source}")]
    WriteFailed {
        /// Path to the report file
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Failed to serialize the report.
    #[error("Failed to serialize report: {message}")]
    Serialize {
        /// Error message describing the serialization failure
        message: String,
    },
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialize {
            message: err.to_string(),
        }
    }
}
