//! AssetLoader CLI - Command-line interface
//!
//! Drives load sessions from JSON manifests and manages loader settings.

mod commands;
mod error;
mod manifest;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use assetloader::logging::{init_logging, LogOptions};
use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::load::LoadArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "assetloader", version, about = "Selective loader for content packages")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to a daily file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a load session against a manifest
    Load(LoadArgs),

    /// Show whether identifiers are workshop, private or legacy
    Classify {
        /// Identifiers in package.item form
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// View or change loader settings
    Config {
        /// Settings file (default: the user settings file)
        #[arg(long)]
        file: Option<PathBuf>,

        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut options = LogOptions::default().with_verbose(cli.verbose);
    if let Some(dir) = cli.log_dir.clone().or_else(default_log_dir) {
        options = options.with_file_dir(dir);
    }
    let _guard = match init_logging(&options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Load(args) => commands::load::run(args),
        Commands::Classify { ids } => commands::classify::run(&ids),
        Commands::Config { file, command } => commands::config::run(command, file),
    }
}

/// Log directory under the platform state or cache directory.
fn default_log_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|d| d.join("assetloader").join("logs"))
}
