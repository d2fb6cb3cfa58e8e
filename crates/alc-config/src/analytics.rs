//! Usage analytics, gated on consent.
//!
//! [`AnalyticsObserver`] watches a session and forwards an
//! [`ADD_TO_CHAIN`] event to an [`AnalyticsSink`] whenever a device is
//! appended, but only while consent is accepted. Sink failures are handed
//! back to the session, which logs them and carries on.

use alc_core::{ChainChange, ChainObserver, ChangeKind, ObserverError};
use serde::Serialize;

use crate::consent::{ConsentStatus, consent_status, user_id};
use crate::storage::Storage;

/// Event name sent when a device is appended.
pub const ADD_TO_CHAIN: &str = "add_to_chain";

/// One usage event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsEvent {
    /// Event name.
    pub event: String,
    /// Device name.
    pub device: String,
    /// Device brand.
    pub brand: String,
    /// Anonymous user id.
    pub user_id: String,
}

/// Destination of usage events.
pub trait AnalyticsSink {
    /// Delivers one event.
    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), ObserverError>;
}

/// Writes events to the `tracing` log at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), ObserverError> {
        tracing::info!("analytics: {}", serde_json::to_string(event)?);
        Ok(())
    }
}

/// Session observer that reports appended devices.
#[derive(Debug)]
pub struct AnalyticsObserver<S, K> {
    storage: S,
    sink: K,
}

impl<S: Storage, K: AnalyticsSink> AnalyticsObserver<S, K> {
    /// Reads consent and the user id from `storage`, delivers to `sink`.
    pub fn new(storage: S, sink: K) -> Self {
        Self { storage, sink }
    }

    /// The sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }
}

impl<S: Storage, K: AnalyticsSink> ChainObserver for AnalyticsObserver<S, K> {
    fn name(&self) -> &str {
        "analytics"
    }

    fn chain_changed(&mut self, change: &ChainChange<'_>) -> Result<(), ObserverError> {
        let ChangeKind::DeviceAdded { device, .. } = change.kind else {
            return Ok(());
        };
        if consent_status(&self.storage)? != ConsentStatus::Accepted {
            return Ok(());
        }
        let event = AnalyticsEvent {
            event: ADD_TO_CHAIN.to_string(),
            device: device.name.clone(),
            brand: device.brand.clone(),
            user_id: user_id(&mut self.storage)?.to_string(),
        };
        self.sink.send(&event)
    }
}
