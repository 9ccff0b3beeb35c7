//! The `db update` command: warm the advisory cache for the project's
//! dependencies without producing a report.

use clap::Args;
use std::path::PathBuf;

use crate::cli::exit_codes;
use crate::config::DbUpdateOptions;
use crate::error::BardscanError;
use crate::orchestrator;

/// Arguments for the `db update` command.
#[derive(Args, Debug)]
pub struct DbUpdateArgs {
    /// Report + cache output directory
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Ignore cache reads and re-fetch every advisory
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub refresh_cache: bool,

    /// Override the OSV-compatible advisory API base URL
    #[arg(long, value_name = "URL")]
    pub osv_url: Option<String>,
}

impl DbUpdateArgs {
    pub async fn execute(&self, directory: Option<PathBuf>) -> Result<i32, BardscanError> {
        let options = DbUpdateOptions {
            target_dir: directory.unwrap_or_else(|| PathBuf::from(".")),
            out_dir: self
                .out_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("./.bardcheck")),
            refresh_cache: self.refresh_cache,
            osv_url: self
                .osv_url
                .clone()
                .unwrap_or_else(|| "https://api.osv.dev".to_string()),
        };

        let summary = orchestrator::run_db_update(&options).await?;
        println!(
            "warmed {} packages, {} cache writes, {} failures",
            summary.warmed, summary.writes, summary.failures
        );

        Ok(exit_codes::SUCCESS)
    }
}
