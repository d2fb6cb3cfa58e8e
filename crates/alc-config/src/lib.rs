//! Persistence, consent and settings for the alc signal-chain planner.
//!
//! This crate connects an [`alc_core::Session`] to durable state: the chain
//! document, the analytics consent flag, the anonymous user id, and user
//! settings.
//!
//! # Features
//!
//! - **Storage**: [`Storage`] key/value backends, file or in-memory
//! - **Chain documents**: JSON encoding with legacy-node migration ([`document`])
//! - **Auto-save**: [`ChainStore`] persists the chain after every session mutation
//! - **Consent & analytics**: [`ConsentStatus`] and the [`AnalyticsObserver`]
//! - **Settings**: [`Settings`] in `settings.toml`, [`SourceMap`] for documentation links
//! - **Paths**: Platform-specific config and data directories
//!
//! # Example
//!
//! ```rust,no_run
//! use alc_config::{ChainStore, FileStorage, Settings, paths};
//! use alc_core::{Catalog, Session};
//!
//! let settings = Settings::load_or_default(paths::settings_path());
//! let catalog = Catalog::load(settings.catalog_path()).unwrap();
//! let store = ChainStore::new(FileStorage::new(settings.storage_dir()));
//!
//! let mut session = Session::with_chain(catalog, store.load_or_empty());
//! session.add_observer(Box::new(store));
//! ```

mod analytics;
mod consent;
mod error;
mod settings;
mod sources;
mod storage;
mod store;

/// Chain document encoding and legacy migration.
pub mod document;

/// Platform-specific paths for settings, storage and the catalog.
pub mod paths;

pub use analytics::{ADD_TO_CHAIN, AnalyticsEvent, AnalyticsObserver, AnalyticsSink, TracingSink};
pub use consent::{ConsentStatus, consent_status, set_consent, user_id};
pub use error::ConfigError;
pub use settings::Settings;
pub use sources::SourceMap;
pub use storage::{CHAIN_KEY, CONSENT_KEY, FileStorage, MemoryStorage, Storage, USER_ID_KEY};
pub use store::ChainStore;
