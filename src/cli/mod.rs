//! # CLI Module
//!
//! This module defines the command-line interface for bardscan using `clap`.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Resolve the project's lockfile, match advisories, emit reports |
//! | `db update` | Warm the advisory cache for the project's dependencies |
//!
//! ## Submodules
//!
//! - [`commands`] - Command implementations
//! - [`exit_codes`] - Standardized exit codes
//! - [`output`] - Report output formatters (JSON, Markdown, SARIF, Terminal)
//!
//! ## Global Options
//!
//! All commands support these global options:
//!
//! - `-v, --verbose` - Increase verbosity level (use multiple times: -v, -vv, -vvv)
//! - `--log-format <text|json>` - Log formatting (default: text)
//! - `-C, --directory <DIR>` - Working directory (defaults to current directory)
//!
//! ## Examples
//!
//! ```bash
//! # Scan the current project, writing JSON + Markdown reports
//! bardscan scan
//!
//! # Scan with a stricter failure threshold and SARIF output for CI
//! bardscan scan --fail-on medium --format sarif
//!
//! # Warm the advisory cache ahead of an offline scan
//! bardscan db update
//! ```

pub mod commands;
pub mod exit_codes;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{DbUpdateArgs, ScanArgs};

/// bardscan - npm dependency vulnerability scanner
#[derive(Parser, Debug)]
#[command(name = "bardscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_name = "FORMAT",
        default_value = "text",
        env = "BARDSCAN_LOG_FORMAT"
    )]
    pub log_format: String,

    /// Run as if invoked from this directory
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the project's lockfile for known advisories
    Scan(ScanArgs),

    /// Warm the advisory cache for the project's dependencies
    #[command(name = "db")]
    Db(DbCommand),
}

#[derive(clap::Args, Debug)]
pub struct DbCommand {
    #[command(subcommand)]
    pub action: DbAction,
}

#[derive(Subcommand, Debug)]
pub enum DbAction {
    /// Warm the advisory cache without producing a report
    Update(DbUpdateArgs),
}
