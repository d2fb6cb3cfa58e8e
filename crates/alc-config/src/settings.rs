//! User settings stored in `settings.toml`.
//!
//! # TOML Format
//!
//! ```toml
//! catalog_path = "/srv/alc/devices.json"
//! sources_path = "/srv/alc/sources.json"
//! storage_dir = "/home/me/.local/share/alc/storage"
//! path_separator = " > "
//! ```
//!
//! Every field is optional. Missing paths resolve to the platform defaults in
//! [`paths`](crate::paths).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths;

/// User settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Device catalog file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Documentation source map file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources_path: Option<PathBuf>,
    /// Directory for persisted keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    /// Separator between branch names in path labels.
    pub path_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: None,
            sources_path: None,
            storage_dir: None,
            path_separator: alc_core::PATH_SEPARATOR.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parses settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Loads settings from `path`, using defaults when the file is missing
    /// or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("settings_load: {e}; using defaults");
            Self::default()
        })
    }

    /// Saves the settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Catalog file, configured or default.
    pub fn catalog_path(&self) -> PathBuf {
        self.catalog_path.clone().unwrap_or_else(paths::default_catalog_path)
    }

    /// Source map file, configured or default.
    pub fn sources_path(&self) -> PathBuf {
        self.sources_path.clone().unwrap_or_else(paths::default_sources_path)
    }

    /// Storage directory, configured or default.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(paths::default_storage_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
        assert_eq!(Settings::default().path_separator, " > ");
    }

    #[test]
    fn partial_toml() {
        let settings = Settings::from_toml("catalog_path = \"/tmp/devices.json\"").unwrap();
        assert_eq!(settings.catalog_path(), PathBuf::from("/tmp/devices.json"));
        assert_eq!(settings.storage_dir(), paths::default_storage_dir());
    }

    #[test]
    fn save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested/settings.toml");
        let settings = Settings {
            storage_dir: Some(temp.path().join("store")),
            path_separator: " / ".to_string(),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn invalid_file_falls_back() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("settings.toml");
        std::fs::write(&path, "path_separator = [").unwrap();
        assert!(matches!(Settings::load(&path), Err(ConfigError::TomlParse(_))));
        assert_eq!(Settings::load_or_default(&path), Settings::default());
        let missing = temp.path().join("missing.toml");
        assert_eq!(Settings::load_or_default(missing), Settings::default());
    }
}
