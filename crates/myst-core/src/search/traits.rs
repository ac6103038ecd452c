//! Search index trait definition.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::Result;
use crate::storage::SecretDocument;

/// Full-text index over secret metadata.
///
/// Implementations index `key`, `website` and `notes` only. The encrypted
/// value never reaches the index. Index writes are not covered by store
/// transactions; the manager compensates for that.
pub trait SearchIndex: Send {
    /// Add or overwrite the document for `id`.
    fn index(&mut self, id: &Uuid, document: &SecretDocument) -> Result<()>;

    /// Remove the document for `id`. Removing an unknown ID is not an error.
    fn delete(&mut self, id: &Uuid) -> Result<()>;

    /// IDs matching `query`, most relevant first.
    ///
    /// Returns an empty list when nothing matches.
    fn search(&self, query: &str) -> Result<Vec<Uuid>>;

    /// The set of all indexed IDs, for reconciliation against the store.
    fn document_ids(&self) -> Result<HashSet<Uuid>>;

    /// The stored document for `id`, if any.
    fn document(&self, id: &Uuid) -> Result<Option<SecretDocument>>;
}
