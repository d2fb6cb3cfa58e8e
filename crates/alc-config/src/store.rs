//! Chain persistence on top of a [`Storage`].

use alc_core::{Chain, ChainChange, ChainObserver, ObserverError};

use crate::document;
use crate::error::ConfigError;
use crate::storage::{CHAIN_KEY, Storage};

/// Saves and loads the chain document under [`CHAIN_KEY`].
///
/// Registered as a [`ChainObserver`], it persists the chain after every
/// mutation of a session.
#[derive(Debug, Clone)]
pub struct ChainStore<S> {
    storage: S,
}

impl<S: Storage> ChainStore<S> {
    /// Wraps a storage backend.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the store and returns the storage backend.
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Writes the chain.
    pub fn save(&mut self, chain: &Chain) -> Result<(), ConfigError> {
        let json = document::to_json(chain)?;
        self.storage.set(CHAIN_KEY, &json)
    }

    /// Reads the chain; `Ok(None)` when nothing was saved.
    pub fn load(&self) -> Result<Option<Chain>, ConfigError> {
        self.storage
            .get(CHAIN_KEY)?
            .map(|json| document::from_json(&json))
            .transpose()
    }

    /// Reads the chain, starting empty when nothing was saved or the saved
    /// document cannot be used.
    pub fn load_or_empty(&self) -> Chain {
        match self.load() {
            Ok(chain) => chain.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("chain_load: {e}; starting with an empty chain");
                Chain::new()
            }
        }
    }

    /// Deletes the saved chain.
    pub fn clear(&mut self) -> Result<(), ConfigError> {
        self.storage.remove(CHAIN_KEY)
    }
}

impl<S: Storage> ChainObserver for ChainStore<S> {
    fn name(&self) -> &str {
        "chain_store"
    }

    fn chain_changed(&mut self, change: &ChainChange<'_>) -> Result<(), ObserverError> {
        self.save(change.chain)?;
        Ok(())
    }
}
