//! Loader settings.
//!
//! Settings live in an INI file in the platform config directory
//! (`~/.config/assetloader/settings.ini` on Linux):
//!
//! ```ini
//! [loading]
//! load_enabled = true
//! load_used = true
//! yield_interval_ms = 200
//!
//! [sharing]
//! textures = true
//! materials = true
//! meshes = true
//!
//! [report]
//! report_assets = true
//! directory = /home/me/.local/share/assetloader/reports
//! ```
//!
//! Every key is optional; missing keys keep their defaults. Individual keys
//! can be read and written through [`ConfigKey`], which backs the CLI's
//! `config get` and `config set` commands.

mod keys;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::{debug, warn};

use crate::sharing::SharingOptions;

pub use keys::ConfigKey;

/// Default pause between cooperative yields, in milliseconds.
pub const DEFAULT_YIELD_INTERVAL_MS: u64 = 200;

const APP_DIR: &str = "assetloader";
const SETTINGS_FILE: &str = "settings.ini";

/// Errors raised while reading or writing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Settings consumed by a load session.
///
/// # Example
///
/// ```
/// use assetloader::config::LoaderSettings;
///
/// let settings = LoaderSettings::default()
///     .with_load_used(false)
///     .with_share_meshes(false);
///
/// assert!(settings.load_enabled);
/// assert!(!settings.sharing_options().meshes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    /// Load items enabled in the content library.
    pub load_enabled: bool,
    /// Load items the saved world references.
    pub load_used: bool,
    pub share_textures: bool,
    pub share_materials: bool,
    pub share_meshes: bool,
    /// Write the diagnostic report at the end of a session.
    pub report_assets: bool,
    /// Directory reports are written to.
    pub report_dir: PathBuf,
    pub yield_interval_ms: u64,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            load_enabled: true,
            load_used: true,
            share_textures: true,
            share_materials: true,
            share_meshes: true,
            report_assets: true,
            report_dir: default_report_dir(),
            yield_interval_ms: DEFAULT_YIELD_INTERVAL_MS,
        }
    }
}

/// Path of the settings file.
pub fn settings_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(SETTINGS_FILE)
}

/// Default report directory.
pub fn default_report_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("reports")
}

impl LoaderSettings {
    pub fn with_load_enabled(mut self, value: bool) -> Self {
        self.load_enabled = value;
        self
    }

    pub fn with_load_used(mut self, value: bool) -> Self {
        self.load_used = value;
        self
    }

    pub fn with_share_textures(mut self, value: bool) -> Self {
        self.share_textures = value;
        self
    }

    pub fn with_share_materials(mut self, value: bool) -> Self {
        self.share_materials = value;
        self
    }

    pub fn with_share_meshes(mut self, value: bool) -> Self {
        self.share_meshes = value;
        self
    }

    pub fn with_report_assets(mut self, value: bool) -> Self {
        self.report_assets = value;
        self
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn with_yield_interval_ms(mut self, ms: u64) -> Self {
        self.yield_interval_ms = ms;
        self
    }

    /// Sharing toggles for the checksum cache.
    pub fn sharing_options(&self) -> SharingOptions {
        SharingOptions {
            textures: self.share_textures,
            materials: self.share_materials,
            meshes: self.share_meshes,
        }
    }

    /// Pause between cooperative yields.
    pub fn yield_interval(&self) -> Duration {
        Duration::from_millis(self.yield_interval_ms)
    }

    /// Load from the default settings file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&settings_file_path())
    }

    /// Load from the default file, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read settings, using defaults");
            Self::default()
        })
    }

    /// Load from a file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut settings = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut settings, value)?;
            }
        }
        Ok(settings)
    }

    /// Save to the default settings file.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&settings_file_path())
    }

    /// Save to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path)?;

        debug!(path = %path.display(), "Settings saved");
        Ok(())
    }
}
