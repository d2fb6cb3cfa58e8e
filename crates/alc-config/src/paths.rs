//! Platform-specific paths for settings, storage and the device catalog.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/alc/` (Linux), `~/Library/Application Support/alc/` (macOS), `%APPDATA%\alc\` (Windows)
//! - **Storage**: `<data dir>/alc/storage/`, one file per storage key
//! - **Catalog**: `<data dir>/alc/devices.json`, documentation sources in `sources.json`
//!
//! # Example
//!
//! ```rust,no_run
//! use alc_config::paths;
//!
//! println!("settings: {:?}", paths::settings_path());
//! println!("storage:  {:?}", paths::default_storage_dir());
//! ```

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "alc";

/// Subdirectory of the data directory holding stored keys.
const STORAGE_SUBDIR: &str = "storage";

/// Settings file name inside the config directory.
const SETTINGS_FILE: &str = "settings.toml";

/// Catalog file name inside the data directory.
const CATALOG_FILE: &str = "devices.json";

/// Documentation source map file name inside the data directory.
const SOURCES_FILE: &str = "sources.json";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific data directory.
///
/// Returns a fallback path if the data directory cannot be determined.
pub fn user_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the settings file.
pub fn settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Default directory for [`FileStorage`](crate::FileStorage).
pub fn default_storage_dir() -> PathBuf {
    user_data_dir().join(STORAGE_SUBDIR)
}

/// Default device catalog location.
pub fn default_catalog_path() -> PathBuf {
    user_data_dir().join(CATALOG_FILE)
}

/// Default documentation source map location.
pub fn default_sources_path() -> PathBuf {
    user_data_dir().join(SOURCES_FILE)
}

/// Creates `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }
    Ok(())
}

/// Ensures the user config directory exists.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();
    ensure_dir(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_end_with_app_layout() {
        assert!(user_config_dir().ends_with("alc"));
        assert!(settings_path().ends_with("alc/settings.toml"));
        assert!(default_storage_dir().ends_with("alc/storage"));
        assert!(default_catalog_path().ends_with("alc/devices.json"));
        assert!(default_sources_path().ends_with("alc/sources.json"));
    }

    #[test]
    fn ensure_dir_creates_nested() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
