//! Addressable configuration keys.

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, LoaderSettings};

/// A `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    LoadEnabled,
    LoadUsed,
    YieldIntervalMs,
    ShareTextures,
    ShareMaterials,
    ShareMeshes,
    ReportAssets,
    ReportDirectory,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::LoadEnabled,
            ConfigKey::LoadUsed,
            ConfigKey::YieldIntervalMs,
            ConfigKey::ShareTextures,
            ConfigKey::ShareMaterials,
            ConfigKey::ShareMeshes,
            ConfigKey::ReportAssets,
            ConfigKey::ReportDirectory,
        ]
    }

    /// INI section.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::LoadEnabled | ConfigKey::LoadUsed | ConfigKey::YieldIntervalMs => "loading",
            ConfigKey::ShareTextures | ConfigKey::ShareMaterials | ConfigKey::ShareMeshes => {
                "sharing"
            }
            ConfigKey::ReportAssets | ConfigKey::ReportDirectory => "report",
        }
    }

    /// Key within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::LoadEnabled => "load_enabled",
            ConfigKey::LoadUsed => "load_used",
            ConfigKey::YieldIntervalMs => "yield_interval_ms",
            ConfigKey::ShareTextures => "textures",
            ConfigKey::ShareMaterials => "materials",
            ConfigKey::ShareMeshes => "meshes",
            ConfigKey::ReportAssets => "report_assets",
            ConfigKey::ReportDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text.
    pub fn get(&self, settings: &LoaderSettings) -> String {
        match self {
            ConfigKey::LoadEnabled => settings.load_enabled.to_string(),
            ConfigKey::LoadUsed => settings.load_used.to_string(),
            ConfigKey::YieldIntervalMs => settings.yield_interval_ms.to_string(),
            ConfigKey::ShareTextures => settings.share_textures.to_string(),
            ConfigKey::ShareMaterials => settings.share_materials.to_string(),
            ConfigKey::ShareMeshes => settings.share_meshes.to_string(),
            ConfigKey::ReportAssets => settings.report_assets.to_string(),
            ConfigKey::ReportDirectory => settings.report_dir.display().to_string(),
        }
    }

    /// Parse and store a value.
    pub fn set(&self, settings: &mut LoaderSettings, value: &str) -> Result<(), ConfigError> {
        match self {
            ConfigKey::LoadEnabled => settings.load_enabled = self.parse_bool(value)?,
            ConfigKey::LoadUsed => settings.load_used = self.parse_bool(value)?,
            ConfigKey::YieldIntervalMs => {
                settings.yield_interval_ms =
                    value.trim().parse().map_err(|_| self.invalid(value, "expected milliseconds"))?
            }
            ConfigKey::ShareTextures => settings.share_textures = self.parse_bool(value)?,
            ConfigKey::ShareMaterials => settings.share_materials = self.parse_bool(value)?,
            ConfigKey::ShareMeshes => settings.share_meshes = self.parse_bool(value)?,
            ConfigKey::ReportAssets => settings.report_assets = self.parse_bool(value)?,
            ConfigKey::ReportDirectory => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(self.invalid(value, "directory must not be empty"));
                }
                settings.report_dir = PathBuf::from(value);
            }
        }
        Ok(())
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!("loading.load_used".parse::<ConfigKey>().unwrap(), ConfigKey::LoadUsed);
        assert_eq!("sharing.meshes".parse::<ConfigKey>().unwrap(), ConfigKey::ShareMeshes);
        assert!(matches!(
            "sharing.sounds".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = ConfigKey::all().iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigKey::all().len());
    }

    #[test]
    fn test_set_and_get() {
        let mut settings = LoaderSettings::default();
        ConfigKey::ShareTextures.set(&mut settings, "off").unwrap();
        ConfigKey::YieldIntervalMs.set(&mut settings, " 16 ").unwrap();

        assert_eq!(ConfigKey::ShareTextures.get(&settings), "false");
        assert_eq!(ConfigKey::YieldIntervalMs.get(&settings), "16");
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut settings = LoaderSettings::default();
        assert!(ConfigKey::LoadEnabled.set(&mut settings, "sometimes").is_err());
        assert!(ConfigKey::YieldIntervalMs.set(&mut settings, "-1").is_err());
        assert!(ConfigKey::ReportDirectory.set(&mut settings, "  ").is_err());
        assert!(settings.load_enabled);
    }
}
