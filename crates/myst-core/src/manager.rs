//! Secret manager: keeps the relational store and the search index in step.
//!
//! The store and the index are independent failure domains with no shared
//! transaction. Each write is therefore a short saga: the store write runs
//! inside a store transaction, the index write runs alongside it, and every
//! step that can fail after another step succeeded has a compensating action
//! that puts both sides back to "exists in both or neither".
//!
//! | Operation | Steps                                   | Compensation on failure            |
//! |-----------|-----------------------------------------|------------------------------------|
//! | add       | insert → index → commit                 | rollback; delete index document    |
//! | update    | update → commit → reindex               | rollback; or report stale index    |
//! | remove    | delete → unindex → commit               | rollback; or restore index document|
//!
//! Nothing is retried automatically. When compensation itself fails the
//! caller gets `MystError::Consistency` and [`SecretManager::reconcile`]
//! repairs the difference offline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{MystError, Result};
use crate::search::{FtsIndex, SearchIndex};
use crate::session::Session;
use crate::storage::{
    NewSecret, Secret, SecretRecord, SecretStore, SecretUpdate, SqliteSecretStore,
    StoreTransaction,
};
use crate::validation::{normalize_key, normalize_metadata, validate_value};

struct Stores<S, I> {
    store: S,
    index: I,
}

/// Result of comparing the store against the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    /// Number of secrets in the store
    pub secrets: usize,

    /// Number of documents in the index
    pub documents: usize,

    /// In the store, absent from the index
    pub missing_from_index: Vec<Uuid>,

    /// In the index, absent from the store
    pub orphaned_in_index: Vec<Uuid>,

    /// Present in both, but the indexed metadata differs from the store
    pub stale_documents: Vec<Uuid>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.missing_from_index.is_empty()
            && self.orphaned_in_index.is_empty()
            && self.stale_documents.is_empty()
    }
}

/// Orchestrates the store and the index behind a single lock.
///
/// Every public operation holds the lock for its whole duration, so the
/// multi-step protocols never interleave.
pub struct SecretManager<S = SqliteSecretStore, I = FtsIndex> {
    inner: Mutex<Stores<S, I>>,
}

impl SecretManager<SqliteSecretStore, FtsIndex> {
    /// Open (or create) the store and index at the given paths.
    ///
    /// # Errors
    ///
    /// Returns `MystError::InvalidInput` if both paths name the same file.
    pub fn open(store_path: &Path, index_path: &Path) -> Result<Self> {
        if resolved_location(store_path)? == resolved_location(index_path)? {
            return Err(MystError::InvalidInput(format!(
                "Secret store and search index must be separate files (both are {})",
                store_path.display()
            )));
        }

        let store = SqliteSecretStore::open(store_path)?;
        let index = FtsIndex::open(index_path)?;
        Ok(Self::new(store, index))
    }

    /// Manager over in-memory store and index.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(
            SqliteSecretStore::open_in_memory()?,
            FtsIndex::open_in_memory()?,
        ))
    }
}

impl<S: SecretStore, I: SearchIndex> SecretManager<S, I> {
    pub fn new(store: S, index: I) -> Self {
        Self {
            inner: Mutex::new(Stores { store, index }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Stores<S, I>>> {
        self.inner
            .lock()
            .map_err(|_| MystError::Storage("Secret manager lock poisoned".to_string()))
    }

    /// Seal and store a new secret, then index its metadata.
    ///
    /// # Errors
    ///
    /// - `MystError::Validation` / `MystError::DuplicateKey` before any write
    /// - the store or index error that stopped the write, after compensation
    /// - `MystError::Consistency` if compensation could not remove an index
    ///   document left behind by a failed write
    pub fn add_secret(&self, session: &Session, new: NewSecret) -> Result<Secret> {
        let key = normalize_key(&new.key)?;
        validate_value(&new.value)?;
        let record = SecretRecord {
            id: Uuid::new_v4(),
            key,
            encrypted_value: session.seal(&new.value)?,
            website: normalize_metadata("Website", new.website.as_deref())?,
            notes: normalize_metadata("Notes", new.notes.as_deref())?,
        };

        let mut guard = self.lock()?;
        let Stores { store, index } = &mut *guard;

        let mut tx = store.begin()?;
        if tx.key_exists(&record.key)? {
            rollback_quietly(tx);
            return Err(MystError::DuplicateKey(record.key));
        }

        let secret = match tx.insert_secret(&record) {
            Ok(secret) => secret,
            Err(err) => {
                rollback_quietly(tx);
                return Err(err);
            }
        };

        if let Err(err) = index.index(&record.id, &record.document()) {
            rollback_quietly(tx);
            warn!(id = %record.id, error = %err, "indexing failed; removing partial index document");
            return Err(discard_document(index, &record.id, err));
        }

        if let Err(err) = tx.commit() {
            warn!(id = %record.id, error = %err, "commit failed after indexing; removing orphaned index document");
            return Err(discard_document(index, &record.id, err));
        }

        debug!(id = %secret.id, "added secret");
        Ok(secret)
    }

    /// Apply `update` to the secret `id`.
    ///
    /// A new value is sealed under a fresh salt and nonce; metadata-only
    /// updates leave the stored envelope untouched. The store write commits
    /// first, then the index document is rebuilt.
    ///
    /// # Errors
    ///
    /// - `MystError::SecretNotFound` if `id` is not stored
    /// - the store error, with nothing written to either side
    /// - `MystError::Consistency` if the store committed but the index could
    ///   not be refreshed; [`SecretManager::reconcile`] repairs it
    pub fn update_secret(&self, session: &Session, id: &Uuid, update: SecretUpdate) -> Result<Secret> {
        if update.is_empty() {
            return Err(MystError::Validation("Nothing to update".to_string()));
        }
        let touches_metadata = update.touches_metadata();
        let sealed = match update.value.as_deref() {
            Some(value) => {
                validate_value(value)?;
                Some(session.seal(value)?)
            }
            None => None,
        };
        let website = update
            .website
            .as_deref()
            .map(|w| normalize_metadata("Website", Some(w)))
            .transpose()?;
        let notes = update
            .notes
            .as_deref()
            .map(|n| normalize_metadata("Notes", Some(n)))
            .transpose()?;

        let mut guard = self.lock()?;
        let Stores { store, index } = &mut *guard;

        let current = store
            .get_secret(id)?
            .ok_or(MystError::SecretNotFound(*id))?;
        let mut record = SecretRecord::from(&current);
        if let Some(sealed) = sealed {
            record.encrypted_value = sealed;
        }
        if let Some(website) = website {
            record.website = website;
        }
        if let Some(notes) = notes {
            record.notes = notes;
        }

        let mut tx = store.begin()?;
        let updated = match tx.update_secret(&record) {
            Ok(updated) => updated,
            Err(err) => {
                rollback_quietly(tx);
                return Err(err);
            }
        };
        tx.commit()?;

        if let Err(err) = reindex(index, &updated) {
            warn!(id = %updated.id, error = %err, "secret updated but search index is stale; run reconcile");
            return Err(MystError::Consistency {
                id: updated.id,
                detail: format!("store updated but index refresh failed: {}", err),
            });
        }

        debug!(id = %updated.id, metadata = touches_metadata, "updated secret");
        Ok(updated)
    }

    /// Permanently remove the secret `id` from both stores.
    ///
    /// If the index cannot be updated the store delete is rolled back and
    /// the secret stays live in both.
    pub fn remove_secret(&self, id: &Uuid) -> Result<Secret> {
        let mut guard = self.lock()?;
        let Stores { store, index } = &mut *guard;

        let mut tx = store.begin()?;
        let secret = match tx.get_secret(id) {
            Ok(Some(secret)) => secret,
            Ok(None) => {
                rollback_quietly(tx);
                return Err(MystError::SecretNotFound(*id));
            }
            Err(err) => {
                rollback_quietly(tx);
                return Err(err);
            }
        };

        if let Err(err) = tx.delete_secret(id) {
            rollback_quietly(tx);
            return Err(err);
        }

        if let Err(err) = index.delete(id) {
            rollback_quietly(tx);
            warn!(%id, error = %err, "index delete failed; secret kept");
            return Err(err);
        }

        if let Err(err) = tx.commit() {
            warn!(%id, error = %err, "commit failed after unindexing; restoring index document");
            if let Err(restore_err) = index.index(id, &secret.document()) {
                warn!(%id, error = %restore_err, "could not restore index document");
                return Err(MystError::Consistency {
                    id: *id,
                    detail: format!(
                        "delete was rolled back ({}) but the index document could not be restored ({})",
                        err, restore_err
                    ),
                });
            }
            return Err(err);
        }

        debug!(%id, "removed secret");
        Ok(secret)
    }

    /// Search metadata and fetch the matching secrets, most relevant first.
    ///
    /// IDs the index returns but the store no longer holds are skipped.
    pub fn find_secrets(&self, query: &str) -> Result<Vec<Secret>> {
        let mut guard = self.lock()?;
        let Stores { store, index } = &mut *guard;

        let ids = index.search(query)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let tx = store.begin_read()?;
        let found = tx.get_secrets(&ids)?;
        tx.commit()?;

        let mut by_id: HashMap<Uuid, Secret> =
            found.into_iter().map(|secret| (secret.id, secret)).collect();
        let mut secrets = Vec::with_capacity(by_id.len());
        for id in ids {
            match by_id.remove(&id) {
                Some(secret) => secrets.push(secret),
                None => debug!(%id, "skipping indexed id missing from store"),
            }
        }
        Ok(secrets)
    }

    /// Get a secret by ID, straight from the store.
    pub fn get_secret(&self, id: &Uuid) -> Result<Secret> {
        let guard = self.lock()?;
        guard
            .store
            .get_secret(id)?
            .ok_or(MystError::SecretNotFound(*id))
    }

    /// Get a secret by its key, straight from the store.
    pub fn find_by_key(&self, key: &str) -> Result<Option<Secret>> {
        let guard = self.lock()?;
        guard.store.find_by_key(key.trim())
    }

    /// All secrets, ordered by key, straight from the store.
    pub fn list_secrets(&self) -> Result<Vec<Secret>> {
        let guard = self.lock()?;
        guard.store.list_secrets()
    }

    /// Decrypt the value of secret `id`.
    pub fn reveal(&self, session: &Session, id: &Uuid) -> Result<String> {
        let secret = self.get_secret(id)?;
        session.open(&secret.encrypted_value)
    }

    /// Compare the store against the index without changing either.
    pub fn verify_consistency(&self) -> Result<ConsistencyReport> {
        let guard = self.lock()?;
        guard.store.check_integrity()?;
        diff(&guard.store, &guard.index)
    }

    /// Offline repair pass.
    ///
    /// Indexes store rows missing from the index, refreshes stale documents,
    /// and deletes index documents with no store row. Returns what was found
    /// (and repaired).
    pub fn reconcile(&self) -> Result<ConsistencyReport> {
        let mut guard = self.lock()?;
        let Stores { store, index } = &mut *guard;

        let report = diff(store, index)?;
        for id in report
            .missing_from_index
            .iter()
            .chain(report.stale_documents.iter())
        {
            let secret = store
                .get_secret(id)?
                .ok_or(MystError::SecretNotFound(*id))?;
            reindex(index, &secret)?;
        }
        for id in &report.orphaned_in_index {
            index.delete(id)?;
        }

        if report.is_consistent() {
            debug!(secrets = report.secrets, "reconcile found nothing to repair");
        } else {
            info!(
                reindexed = report.missing_from_index.len() + report.stale_documents.len(),
                purged = report.orphaned_in_index.len(),
                "reconciled search index with store"
            );
        }
        Ok(report)
    }
}

fn rollback_quietly<T: StoreTransaction>(tx: T) {
    if let Err(err) = tx.rollback() {
        warn!(error = %err, "store rollback failed");
    }
}

/// Compensate a failed add: remove whatever the index holds for `id`.
///
/// Returns the error to surface: the original one when compensation
/// succeeded, a consistency error when it did not.
fn discard_document<I: SearchIndex>(index: &mut I, id: &Uuid, cause: MystError) -> MystError {
    match index.delete(id) {
        Ok(()) => cause,
        Err(compensation) => {
            warn!(%id, error = %compensation, "could not remove orphaned index document");
            MystError::Consistency {
                id: *id,
                detail: format!(
                    "write failed ({}) and the orphaned index document could not be removed ({})",
                    cause, compensation
                ),
            }
        }
    }
}

fn reindex<I: SearchIndex>(index: &mut I, secret: &Secret) -> Result<()> {
    index.delete(&secret.id)?;
    index.index(&secret.id, &secret.document())
}

/// Absolute location of `path` with its nearest existing ancestor
/// canonicalized, so `.`, `..` and symlinked directories compare equal.
fn resolved_location(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut pending = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(mut resolved) = current.canonicalize() {
            resolved.extend(pending.iter().rev().copied());
            return Ok(resolved);
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                pending.push(name);
                current = parent;
            }
            _ => return Ok(absolute.clone()),
        }
    }
}

fn diff<S: SecretStore, I: SearchIndex>(store: &S, index: &I) -> Result<ConsistencyReport> {
    let secrets = store.list_secrets()?;
    let secret_ids = store.secret_ids()?;
    let document_ids = index.document_ids()?;

    let mut report = ConsistencyReport {
        secrets: secrets.len(),
        documents: document_ids.len(),
        ..ConsistencyReport::default()
    };

    for secret in &secrets {
        if !document_ids.contains(&secret.id) {
            report.missing_from_index.push(secret.id);
        } else if index.document(&secret.id)?.as_ref() != Some(&secret.document()) {
            report.stale_documents.push(secret.id);
        }
    }
    report.orphaned_in_index = document_ids
        .into_iter()
        .filter(|id| !secret_ids.contains(id))
        .collect();

    report.missing_from_index.sort();
    report.orphaned_in_index.sort();
    report.stale_documents.sort();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Envelope;

    fn setup() -> (SecretManager, Session) {
        let manager = SecretManager::open_in_memory().unwrap();
        let (session, _) = Session::create("master-passphrase").unwrap();
        (manager, session)
    }

    #[test]
    fn test_add_then_find_personal_token() {
        let (manager, session) = setup();
        let added = manager
            .add_secret(&session, NewSecret::new("github", "tok123").with_notes("personal token"))
            .unwrap();

        let found = manager.find_secrets("personal").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "github");
        assert_eq!(found[0].id, added.id);
        assert_eq!(manager.reveal(&session, &added.id).unwrap(), "tok123");

        manager.remove_secret(&added.id).unwrap();
        assert!(manager.find_secrets("personal").unwrap().is_empty());
        assert!(matches!(
            manager.get_secret(&added.id),
            Err(MystError::SecretNotFound(id)) if id == added.id
        ));
    }

    #[test]
    fn test_duplicate_key_rejected_before_write() {
        let (manager, session) = setup();
        manager
            .add_secret(&session, NewSecret::new("github", "tok123"))
            .unwrap();

        let err = manager
            .add_secret(&session, NewSecret::new(" github ", "other"))
            .unwrap_err();
        assert!(matches!(err, MystError::DuplicateKey(ref key) if key == "github"));
        assert_eq!(manager.list_secrets().unwrap().len(), 1);
        assert!(manager.verify_consistency().unwrap().is_consistent());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let (manager, session) = setup();
        assert!(manager
            .add_secret(&session, NewSecret::new("", "tok123"))
            .unwrap_err()
            .is_validation());
        assert!(manager
            .add_secret(&session, NewSecret::new("github", ""))
            .unwrap_err()
            .is_validation());
        assert!(manager.list_secrets().unwrap().is_empty());
    }

    #[test]
    fn test_notes_only_update_keeps_envelope() {
        let (manager, session) = setup();
        let added = manager
            .add_secret(&session, NewSecret::new("github", "tok123"))
            .unwrap();

        let updated = manager
            .update_secret(&session, &added.id, SecretUpdate::new().notes("work token"))
            .unwrap();

        assert_eq!(updated.encrypted_value, added.encrypted_value);
        assert_eq!(updated.notes.as_deref(), Some("work token"));
        assert_eq!(updated.created_at, added.created_at);
        assert_eq!(manager.find_secrets("work").unwrap()[0].id, added.id);
    }

    #[test]
    fn test_value_update_mints_fresh_envelope() {
        let (manager, session) = setup();
        let added = manager
            .add_secret(&session, NewSecret::new("github", "tok123"))
            .unwrap();

        let updated = manager
            .update_secret(&session, &added.id, SecretUpdate::new().value("tok123"))
            .unwrap();

        let before = Envelope::parse(&added.encrypted_value).unwrap();
        let after = Envelope::parse(&updated.encrypted_value).unwrap();
        assert_ne!(before.salt, after.salt);
        assert_ne!(before.nonce, after.nonce);
        assert_eq!(manager.reveal(&session, &added.id).unwrap(), "tok123");
    }

    #[test]
    fn test_empty_update_rejected() {
        let (manager, session) = setup();
        let added = manager
            .add_secret(&session, NewSecret::new("github", "tok123"))
            .unwrap();
        assert!(manager
            .update_secret(&session, &added.id, SecretUpdate::new())
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_missing_secret_errors() {
        let (manager, session) = setup();
        let id = Uuid::new_v4();
        assert!(manager.remove_secret(&id).unwrap_err().is_not_found());
        assert!(manager
            .update_secret(&session, &id, SecretUpdate::new().notes("x"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_list_and_lookup_bypass_index() {
        let (manager, session) = setup();
        manager
            .add_secret(&session, NewSecret::new("zeta", "1"))
            .unwrap();
        manager
            .add_secret(&session, NewSecret::new("Alpha", "2"))
            .unwrap();

        let keys: Vec<_> = manager
            .list_secrets()
            .unwrap()
            .into_iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(keys, vec!["Alpha", "zeta"]);
        assert!(manager.find_by_key("zeta").unwrap().is_some());
        assert!(manager.find_by_key("missing").unwrap().is_none());
    }

    #[test]
    fn test_consistency_report_on_fresh_manager() {
        let (manager, _) = setup();
        let report = manager.verify_consistency().unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.secrets, 0);
        assert_eq!(report.documents, 0);
    }

    #[test]
    fn test_blank_metadata_is_not_reported_stale() {
        let (manager, session) = setup();
        let bare = manager
            .add_secret(&session, NewSecret::new("bare", "v1"))
            .unwrap();
        let blank = manager
            .add_secret(
                &session,
                NewSecret::new("blank", "v2").with_website("  ").with_notes(""),
            )
            .unwrap();
        assert_eq!(blank.website, None);
        assert_eq!(blank.notes, None);

        assert_eq!(manager.find_secrets("bare").unwrap()[0].id, bare.id);
        assert!(manager.verify_consistency().unwrap().is_consistent());

        let annotated = manager
            .add_secret(&session, NewSecret::new("annotated", "v3").with_notes("old"))
            .unwrap();
        manager
            .update_secret(&session, &annotated.id, SecretUpdate::new().notes(""))
            .unwrap();

        let report = manager.verify_consistency().unwrap();
        assert!(report.stale_documents.is_empty(), "{report:?}");
        assert!(manager.find_secrets("old").unwrap().is_empty());
    }

    #[test]
    fn test_open_rejects_shared_store_and_index_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        let path = dir.path().join("myst.db");

        let err = SecretManager::open(&path, &path).err().unwrap();
        assert!(matches!(err, MystError::InvalidInput(_)));
        assert!(!path.exists());

        let aliased = dir.path().join("sub").join("..").join("myst.db");
        let err = SecretManager::open(&path, &aliased).err().unwrap();
        assert!(matches!(err, MystError::InvalidInput(_)));

        SecretManager::open(&path, &dir.path().join("index.db")).unwrap();
        let err = SecretManager::open(&path, &aliased).err().unwrap();
        assert!(matches!(err, MystError::InvalidInput(_)));
    }
}
