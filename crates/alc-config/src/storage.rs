//! Durable key/value storage.
//!
//! A [`Storage`] holds small string values under fixed keys, the way a
//! browser's local storage does. [`FileStorage`] keeps one file per key in a
//! directory; [`MemoryStorage`] is for tests and ephemeral sessions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::paths::ensure_dir;

/// Storage key of the persisted chain document.
pub const CHAIN_KEY: &str = "alc_chain";

/// Storage key of the analytics consent flag.
pub const CONSENT_KEY: &str = "alc_consent";

/// Storage key of the anonymous user id.
pub const USER_ID_KEY: &str = "alc_user_id";

/// String key/value store.
pub trait Storage {
    /// Reads a key. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError>;

    /// Writes a key, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Deletes a key. Deleting a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), ConfigError>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ConfigError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ConfigError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::read_file(path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let path = self.path_for(key)?;
        ensure_dir(&self.dir)?;
        std::fs::write(&path, value).map_err(|e| ConfigError::write_file(path, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), ConfigError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ConfigError::remove_file(path, e)),
        }
    }
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ConfigError> {
        self.values.remove(key);
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), ConfigError> {
        (**self).remove(key)
    }
}
