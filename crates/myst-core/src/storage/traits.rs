//! Relational store trait definitions.
//!
//! The `SecretStore` trait defines the record store the manager writes
//! through. Writes always happen inside a `StoreTransaction`, so the manager
//! can group an insert or delete with the matching index mutation and roll
//! the store back if the index step fails.

use std::collections::HashSet;

use uuid::Uuid;

use super::types::{Secret, SecretRecord};
use crate::error::Result;

/// Durable record storage for secrets.
///
/// All implementations must ensure:
/// - `key` is unique among stored secrets, rejected with
///   `MystError::DuplicateKey` before anything is persisted
/// - `created_at` and `updated_at` are set by the store, never the caller
/// - Writes inside a transaction are invisible to other readers until commit
pub trait SecretStore: Send {
    /// Transaction handle borrowed from the store.
    type Transaction<'a>: StoreTransaction
    where
        Self: 'a;

    /// Begin a transaction. Dropping it without commit rolls back.
    fn begin(&mut self) -> Result<Self::Transaction<'_>>;

    /// Begin a read snapshot that takes no write lock until it writes.
    ///
    /// Stores without a cheaper read mode fall back to [`SecretStore::begin`].
    fn begin_read(&mut self) -> Result<Self::Transaction<'_>> {
        self.begin()
    }

    /// Get a secret by ID.
    ///
    /// Returns `Ok(None)` if no secret has this ID.
    fn get_secret(&self, id: &Uuid) -> Result<Option<Secret>>;

    /// Get a secret by its unique key.
    fn find_by_key(&self, key: &str) -> Result<Option<Secret>>;

    /// List all secrets, ordered by key.
    fn list_secrets(&self) -> Result<Vec<Secret>>;

    /// The set of all stored IDs, for reconciliation against the index.
    fn secret_ids(&self) -> Result<HashSet<Uuid>>;

    /// Check store integrity.
    ///
    /// Verifies:
    /// - Database page integrity
    /// - Metadata keys present
    fn check_integrity(&self) -> Result<()>;
}

/// A group of writes that commit or roll back together.
pub trait StoreTransaction {
    /// True if any stored secret uses `key`.
    fn key_exists(&self, key: &str) -> Result<bool>;

    /// Insert a new secret.
    ///
    /// # Errors
    ///
    /// Returns `MystError::DuplicateKey` if the key is taken.
    fn insert_secret(&mut self, record: &SecretRecord) -> Result<Secret>;

    /// Overwrite the mutable columns of an existing secret.
    ///
    /// `id`, `key` and `created_at` are never changed.
    ///
    /// # Errors
    ///
    /// Returns `MystError::SecretNotFound` if no row has this ID.
    fn update_secret(&mut self, record: &SecretRecord) -> Result<Secret>;

    /// Delete a secret permanently.
    ///
    /// # Errors
    ///
    /// Returns `MystError::SecretNotFound` if no row has this ID.
    fn delete_secret(&mut self, id: &Uuid) -> Result<()>;

    /// Get a secret by ID within this transaction.
    fn get_secret(&self, id: &Uuid) -> Result<Option<Secret>>;

    /// Fetch the secrets whose IDs are in `ids`. Missing IDs are skipped.
    fn get_secrets(&self, ids: &[Uuid]) -> Result<Vec<Secret>>;

    /// Commit all writes. On failure every write in the group is rolled back.
    fn commit(self) -> Result<()>;

    /// Discard all writes.
    fn rollback(self) -> Result<()>;
}
