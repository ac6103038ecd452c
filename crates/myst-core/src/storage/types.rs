//! Core data types for the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored secret. The value is only ever held as an encrypted envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Unique identifier, immutable once assigned
    pub id: Uuid,

    /// Human-chosen label, unique among live secrets
    pub key: String,

    /// Envelope of the plaintext value (see `crypto::Envelope`)
    pub encrypted_value: String,

    /// Optional website the secret belongs to
    pub website: Option<String>,

    /// Optional free-form notes
    pub notes: Option<String>,

    /// Set by the store on insert
    pub created_at: DateTime<Utc>,

    /// Set by the store on every update
    pub updated_at: DateTime<Utc>,
}

impl Secret {
    /// The searchable projection of this secret.
    pub fn document(&self) -> SecretDocument {
        SecretDocument {
            key: self.key.clone(),
            website: self.website.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// The writable columns of a secret. Timestamps are owned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub id: Uuid,
    pub key: String,
    pub encrypted_value: String,
    pub website: Option<String>,
    pub notes: Option<String>,
}

impl From<&Secret> for SecretRecord {
    fn from(secret: &Secret) -> Self {
        Self {
            id: secret.id,
            key: secret.key.clone(),
            encrypted_value: secret.encrypted_value.clone(),
            website: secret.website.clone(),
            notes: secret.notes.clone(),
        }
    }
}

impl SecretRecord {
    pub fn document(&self) -> SecretDocument {
        SecretDocument {
            key: self.key.clone(),
            website: self.website.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Metadata indexed for search. Never carries the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretDocument {
    pub key: String,
    pub website: Option<String>,
    pub notes: Option<String>,
}

/// Plaintext input for creating a secret.
#[derive(Clone, PartialEq, Eq)]
pub struct NewSecret {
    pub key: String,
    pub value: String,
    pub website: Option<String>,
    pub notes: Option<String>,
}

impl NewSecret {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            website: None,
            notes: None,
        }
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl std::fmt::Debug for NewSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewSecret")
            .field("key", &self.key)
            .field("value", &"[REDACTED]")
            .field("website", &self.website)
            .field("notes", &self.notes)
            .finish()
    }
}

/// Changes to apply to an existing secret.
///
/// `None` leaves a field untouched. For `website` and `notes`, `Some("")`
/// clears the field.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretUpdate {
    pub value: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
}

impl SecretUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.website.is_none() && self.notes.is_none()
    }

    /// True when the update touches indexed metadata.
    pub fn touches_metadata(&self) -> bool {
        self.website.is_some() || self.notes.is_some()
    }
}

impl std::fmt::Debug for SecretUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretUpdate")
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .field("website", &self.website)
            .field("notes", &self.notes)
            .finish()
    }
}

/// Normalize optional metadata: trimmed, with blank meaning absent.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
