//! Analytics consent and the anonymous user id.
//!
//! Consent is tri-state. Until the user answers, the status is
//! [`ConsentStatus::Unset`] and front ends should ask. Usage events are only
//! sent once consent is [`ConsentStatus::Accepted`].

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::ConfigError;
use crate::storage::{CONSENT_KEY, Storage, USER_ID_KEY};

/// The user's answer to the analytics prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentStatus {
    /// Not answered yet.
    #[default]
    Unset,
    /// Analytics allowed.
    Accepted,
    /// Analytics refused.
    Declined,
}

impl ConsentStatus {
    /// Stored representation; `None` for [`Unset`](Self::Unset).
    pub fn as_stored(&self) -> Option<&'static str> {
        match self {
            Self::Unset => None,
            Self::Accepted => Some("accepted"),
            Self::Declined => Some("declined"),
        }
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_stored().unwrap_or("unset"))
    }
}

impl FromStr for ConsentStatus {
    type Err = std::convert::Infallible;

    /// Unrecognized values read as [`Unset`](Self::Unset) so the user is
    /// asked again.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            _ => Self::Unset,
        })
    }
}

/// Reads the stored consent.
pub fn consent_status(storage: &(impl Storage + ?Sized)) -> Result<ConsentStatus, ConfigError> {
    Ok(storage
        .get(CONSENT_KEY)?
        .and_then(|value| value.parse().ok())
        .unwrap_or_default())
}

/// Stores the consent. [`ConsentStatus::Unset`] deletes the stored answer.
pub fn set_consent(
    storage: &mut (impl Storage + ?Sized),
    status: ConsentStatus,
) -> Result<(), ConfigError> {
    match status.as_stored() {
        Some(value) => storage.set(CONSENT_KEY, value),
        None => storage.remove(CONSENT_KEY),
    }
}

/// The anonymous user id, generated and stored on first use.
///
/// A stored value that is not a valid UUID is replaced.
pub fn user_id(storage: &mut (impl Storage + ?Sized)) -> Result<Uuid, ConfigError> {
    if let Some(stored) = storage.get(USER_ID_KEY)? {
        match Uuid::parse_str(stored.trim()) {
            Ok(id) => return Ok(id),
            Err(e) => tracing::warn!("user_id: discarding stored value ({e})"),
        }
    }
    let id = Uuid::new_v4();
    storage.set(USER_ID_KEY, &id.to_string())?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn consent_defaults_to_unset() {
        let storage = MemoryStorage::new();
        assert_eq!(consent_status(&storage).unwrap(), ConsentStatus::Unset);
    }

    #[test]
    fn consent_round_trip() {
        let mut storage = MemoryStorage::new();
        set_consent(&mut storage, ConsentStatus::Accepted).unwrap();
        assert_eq!(storage.get(CONSENT_KEY).unwrap().as_deref(), Some("accepted"));
        assert_eq!(consent_status(&storage).unwrap(), ConsentStatus::Accepted);

        set_consent(&mut storage, ConsentStatus::Declined).unwrap();
        assert_eq!(consent_status(&storage).unwrap(), ConsentStatus::Declined);

        set_consent(&mut storage, ConsentStatus::Unset).unwrap();
        assert_eq!(storage.get(CONSENT_KEY).unwrap(), None);
    }

    #[test]
    fn unknown_consent_value_is_unset() {
        let mut storage = MemoryStorage::new();
        storage.set(CONSENT_KEY, "maybe").unwrap();
        assert_eq!(consent_status(&storage).unwrap(), ConsentStatus::Unset);
    }

    #[test]
    fn user_id_is_stable_v4() {
        let mut storage = MemoryStorage::new();
        let first = user_id(&mut storage).unwrap();
        assert_eq!(first.get_version_num(), 4);
        assert_eq!(user_id(&mut storage).unwrap(), first);
    }

    #[test]
    fn invalid_user_id_is_replaced() {
        let mut storage = MemoryStorage::new();
        storage.set(USER_ID_KEY, "1718000000000-abc").unwrap();
        let id = user_id(&mut storage).unwrap();
        assert_eq!(storage.get(USER_ID_KEY).unwrap(), Some(id.to_string()));
    }

    #[test]
    fn display_matches_stored_form() {
        assert_eq!(ConsentStatus::Accepted.to_string(), "accepted");
        assert_eq!(ConsentStatus::Unset.to_string(), "unset");
    }
}
