//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use assetloader::config::ConfigError;
use assetloader::pool::PoolError;

/// Errors surfaced to the user by the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Settings could not be read, parsed or written.
    Config(String),
    /// The manifest file is unreadable or malformed.
    Manifest { path: PathBuf, message: String },
    /// The manifest describes an invalid content pool.
    Pool(PoolError),
    /// The async runtime failed.
    Runtime(String),
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Manifest { path, message } => {
                write!(f, "Invalid manifest {}: {}", path.display(), message)
            }
            CliError::Pool(e) => write!(f, "Invalid content pool: {}", e),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<PoolError> for CliError {
    fn from(e: PoolError) -> Self {
        CliError::Pool(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
