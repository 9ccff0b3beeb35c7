//! bardscan - npm dependency vulnerability scanner
//!
//! This is the main entry point for the CLI application.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cache;
mod cli;
mod config;
mod error;
mod evidence;
mod lockfile;
mod model;
mod orchestrator;
mod osv;

use cli::{Cli, Commands, DbAction};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, &cli.log_format);

    let directory = cli.directory.clone();
    let result = match cli.command {
        Commands::Scan(args) => args.execute(directory).await,
        Commands::Db(db) => match db.action {
            DbAction::Update(args) => args.execute(directory).await,
        },
    };

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            tracing::error!(error = %e, "scan aborted");
            eprint!("{}", e.display_formatted());
            std::process::exit(cli::exit_codes::ERROR);
        }
    }
}

fn setup_logging(verbosity: u8, format: &str) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_env("BARDSCAN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
