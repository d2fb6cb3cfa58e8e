//! Documentation sources: where a catalog latency figure comes from.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Map from a device's source key to a documentation URL.
///
/// Stored as a flat JSON object. Devices whose key is missing simply have no
/// link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceMap {
    urls: HashMap<String, String>,
}

impl SourceMap {
    /// Parses a source map from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a source map from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_json(&content)
    }

    /// Loads a source map, falling back to an empty one.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("sources_load: {e}");
            Self::default()
        })
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, url: impl Into<String>) {
        self.urls.insert(key.into(), url.into());
    }

    /// URL for a source key.
    pub fn url_for(&self, key: Option<&str>) -> Option<&str> {
        self.urls.get(key?).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
