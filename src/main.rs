//! TextPAIR Restore Tool
//!
//! Restores TextPAIR database tables and web files from a backup archive,
//! and rebuilds the web application.

// textpair-restore/src/main.rs
mod config;
mod errors;
mod restore;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use config::GlobalConfig;
use errors::RestoreError;
use restore::confirm::ConsolePrompt;
use restore::RestoreOptions;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "textpair-restore",
    about = "Restore a TextPAIR corpus (database tables + web application) from a backup archive"
)]
struct Cli {
    /// Path to the backup archive (.tar.lz4)
    archive_path: PathBuf,

    /// Destination path for web app files (defaults to the configured web_app_path)
    #[arg(long)]
    web_app_dest: Option<PathBuf>,

    /// Overwrite existing tables/files without prompting; configuration and
    /// build failures become warnings
    #[arg(long)]
    force: bool,

    /// Path to the global settings file
    #[arg(long, default_value = config::DEFAULT_SETTINGS_PATH)]
    config: PathBuf,
}

/// Main entry point for the restore tool
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_app(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    let global_config = GlobalConfig::load_from_json(&cli.config).context(format!(
        "Failed to load global settings from {}",
        cli.config.display()
    ))?;

    let options = RestoreOptions {
        archive_path: cli.archive_path,
        web_app_dest: cli.web_app_dest,
        force: cli.force,
    };

    match restore::run_restore_flow(&global_config, &options, &ConsolePrompt).await {
        Ok(()) => Ok(()),
        // A declined confirmation leaves everything untouched; not a failure.
        Err(RestoreError::Cancelled) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
