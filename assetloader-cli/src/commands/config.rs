//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` commands
//! for viewing and modifying loader settings from the command line.

use std::path::{Path, PathBuf};

use assetloader::config::{settings_file_path, ConfigKey, LoaderSettings};
use clap::Subcommand;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., sharing.meshes)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., sharing.meshes)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the settings file at `file`, or the
/// default settings file.
pub fn run(command: ConfigCommands, file: Option<PathBuf>) -> Result<(), CliError> {
    let path = file.unwrap_or_else(settings_file_path);
    match command {
        ConfigCommands::Get { key } => run_get(&path, &key),
        ConfigCommands::Set { key, value } => run_set(&path, &key, &value),
        ConfigCommands::List => run_list(&path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'assetloader config list' to see available keys.",
            key
        ))
    })
}

/// Get a configuration value.
fn run_get(path: &Path, key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let settings = LoaderSettings::load_from(path)?;
    println!("{}", config_key.get(&settings));
    Ok(())
}

/// Set a configuration value.
fn run_set(path: &Path, key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut settings = LoaderSettings::load_from(path)?;
    config_key.set(&mut settings, value)?;
    settings.save_to(path)?;

    println!("Set {} = {}", config_key.name(), config_key.get(&settings));

    Ok(())
}

/// List all configuration settings.
fn run_list(path: &Path) -> Result<(), CliError> {
    let settings = LoaderSettings::load_from(path)?;

    println!("Configuration Settings");
    println!("======================");
    println!();

    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        // Print section header when section changes
        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }

        println!("  {} = {}", key.key_name(), key.get(&settings));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ini");

        run_set(&path, "sharing.textures", "false").unwrap();
        run_set(&path, "loading.yield_interval_ms", "50").unwrap();

        let settings = LoaderSettings::load_from(&path).unwrap();
        assert!(!settings.share_textures);
        assert_eq!(settings.yield_interval_ms, 50);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ini");

        let err = run_set(&path, "sharing.sounds", "true").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_value_not_saved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ini");

        assert!(run_set(&path, "loading.load_used", "maybe").is_err());
        assert!(!path.exists());
    }
}
