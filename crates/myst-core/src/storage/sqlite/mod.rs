//! SQLite-backed relational store.
//!
//! Secrets live in a plain SQLite file; values are already sealed by the
//! crypto layer before they reach this module, so the file itself is not
//! encrypted. Every write runs inside a transaction handed out by
//! [`SqliteSecretStore::begin`].

mod row;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use crate::error::{MystError, Result};
use crate::storage::traits::{SecretStore, StoreTransaction};
use crate::storage::types::{Secret, SecretRecord};

use row::{SecretRow, SECRET_COLUMNS};

/// Current on-disk schema version.
const FORMAT_VERSION: &str = "1";

/// Upper bound on bound parameters per `IN (...)` query.
const MAX_IDS_PER_QUERY: usize = 500;

/// SQLite secret store.
pub struct SqliteSecretStore {
    path: Option<PathBuf>,
    conn: Connection,
}

impl SqliteSecretStore {
    /// Open the store at `path`, creating the file and schema if missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let existed = path.exists();
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        tracing::debug!(path = %path.display(), created = !existed, "opened secret store");

        Ok(Self {
            path: Some(path.to_path_buf()),
            conn,
        })
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { path: None, conn })
    }

    /// Path of the backing file, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS secrets (
                id TEXT PRIMARY KEY,
                key TEXT NOT NULL UNIQUE,
                encrypted_value TEXT NOT NULL,
                website TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        let created_at = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?)",
            [FORMAT_VERSION],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('created_at', ?)",
            [created_at],
        )?;

        let version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        if version != FORMAT_VERSION {
            return Err(MystError::Storage(format!(
                "Unsupported secret store format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        Ok(())
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn query_secret(conn: &Connection, id: &Uuid) -> Result<Option<Secret>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM secrets WHERE id = ?", SECRET_COLUMNS),
            [id.to_string()],
            SecretRow::from_row,
        )
        .optional()?;
    row.map(Secret::try_from).transpose()
}

fn query_secret_by_key(conn: &Connection, key: &str) -> Result<Option<Secret>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM secrets WHERE key = ?", SECRET_COLUMNS),
            [key],
            SecretRow::from_row,
        )
        .optional()?;
    row.map(Secret::try_from).transpose()
}

fn query_secrets(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Secret>> {
    let mut secrets = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM secrets WHERE id IN ({})",
            SECRET_COLUMNS, placeholders
        ))?;
        let params = chunk.iter().map(Uuid::to_string);
        let rows = stmt.query_map(rusqlite::params_from_iter(params), SecretRow::from_row)?;
        for row in rows {
            secrets.push(row?.try_into()?);
        }
    }
    Ok(secrets)
}

impl SecretStore for SqliteSecretStore {
    type Transaction<'a> = SqliteTransaction<'a>;

    fn begin(&mut self) -> Result<SqliteTransaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteTransaction { tx })
    }

    fn begin_read(&mut self) -> Result<SqliteTransaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Deferred)?;
        Ok(SqliteTransaction { tx })
    }

    fn get_secret(&self, id: &Uuid) -> Result<Option<Secret>> {
        query_secret(&self.conn, id)
    }

    fn find_by_key(&self, key: &str) -> Result<Option<Secret>> {
        query_secret_by_key(&self.conn, key)
    }

    fn list_secrets(&self) -> Result<Vec<Secret>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM secrets ORDER BY key COLLATE NOCASE, key",
            SECRET_COLUMNS
        ))?;
        let rows = stmt.query_map([], SecretRow::from_row)?;

        let mut secrets = Vec::new();
        for row in rows {
            secrets.push(row?.try_into()?);
        }
        Ok(secrets)
    }

    fn secret_ids(&self) -> Result<HashSet<Uuid>> {
        let mut stmt = self.conn.prepare("SELECT id FROM secrets")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = HashSet::new();
        for row in rows {
            let value = row?;
            let parsed = Uuid::parse_str(&value)
                .map_err(|e| MystError::Storage(format!("Invalid secret UUID: {}", e)))?;
            ids.insert(parsed);
        }
        Ok(ids)
    }

    fn check_integrity(&self) -> Result<()> {
        let status: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if status != "ok" {
            return Err(MystError::Storage(format!(
                "SQLite integrity check failed: {}",
                status
            )));
        }

        let metadata_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM meta WHERE key IN ('format_version', 'created_at')",
            [],
            |row| row.get(0),
        )?;
        if metadata_count < 2 {
            return Err(MystError::Storage(
                "Metadata table missing required keys".to_string(),
            ));
        }

        Ok(())
    }
}

/// Transaction over a [`SqliteSecretStore`].
///
/// Dropping without [`StoreTransaction::commit`] rolls back, and so does a
/// failed commit.
pub struct SqliteTransaction<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn key_exists(&self, key: &str) -> Result<bool> {
        let found: Option<i64> = self
            .tx
            .query_row("SELECT 1 FROM secrets WHERE key = ?", [key], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_secret(&mut self, record: &SecretRecord) -> Result<Secret> {
        if self.key_exists(&record.key)? {
            return Err(MystError::DuplicateKey(record.key.clone()));
        }

        let now = Utc::now();
        let stamp = now.to_rfc3339();
        let inserted = self.tx.execute(
            r#"
            INSERT INTO secrets (id, key, encrypted_value, website, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            (
                record.id.to_string(),
                &record.key,
                &record.encrypted_value,
                record.website.as_deref(),
                record.notes.as_deref(),
                &stamp,
                &stamp,
            ),
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(MystError::DuplicateKey(record.key.clone()));
            }
            Err(err) => return Err(err.into()),
        }

        Ok(Secret {
            id: record.id,
            key: record.key.clone(),
            encrypted_value: record.encrypted_value.clone(),
            website: record.website.clone(),
            notes: record.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn update_secret(&mut self, record: &SecretRecord) -> Result<Secret> {
        let updated_at = Utc::now().to_rfc3339();
        let changed = self.tx.execute(
            r#"
            UPDATE secrets
            SET encrypted_value = ?, website = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
            (
                &record.encrypted_value,
                record.website.as_deref(),
                record.notes.as_deref(),
                updated_at,
                record.id.to_string(),
            ),
        )?;
        if changed == 0 {
            return Err(MystError::SecretNotFound(record.id));
        }

        query_secret(&self.tx, &record.id)?.ok_or(MystError::SecretNotFound(record.id))
    }

    fn delete_secret(&mut self, id: &Uuid) -> Result<()> {
        let deleted = self
            .tx
            .execute("DELETE FROM secrets WHERE id = ?", [id.to_string()])?;
        if deleted == 0 {
            return Err(MystError::SecretNotFound(*id));
        }
        Ok(())
    }

    fn get_secret(&self, id: &Uuid) -> Result<Option<Secret>> {
        query_secret(&self.tx, id)
    }

    fn get_secrets(&self, ids: &[Uuid]) -> Result<Vec<Secret>> {
        query_secrets(&self.tx, ids)
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str) -> SecretRecord {
        SecretRecord {
            id: Uuid::new_v4(),
            key: key.to_string(),
            encrypted_value: format!("{}-sealed", key),
            website: None,
            notes: Some(format!("notes for {}", key)),
        }
    }

    fn insert(store: &mut SqliteSecretStore, key: &str) -> Secret {
        let mut tx = store.begin().unwrap();
        let secret = tx.insert_secret(&record(key)).unwrap();
        tx.commit().unwrap();
        secret
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = SqliteSecretStore::open_in_memory().unwrap();
        let secret = insert(&mut store, "github");

        let fetched = store.get_secret(&secret.id).unwrap().unwrap();
        assert_eq!(fetched.key, "github");
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert_eq!(store.find_by_key("github").unwrap().unwrap().id, secret.id);
    }

    #[test]
    fn test_duplicate_key_rejected_without_write() {
        let mut store = SqliteSecretStore::open_in_memory().unwrap();
        insert(&mut store, "github");

        let mut tx = store.begin().unwrap();
        let err = tx.insert_secret(&record("github")).unwrap_err();
        assert!(matches!(err, MystError::DuplicateKey(ref key) if key == "github"));
        tx.rollback().unwrap();

        assert_eq!(store.list_secrets().unwrap().len(), 1);
    }

    #[test]
    fn test_rollback_discards_writes() {
        let mut store = SqliteSecretStore::open_in_memory().unwrap();
        let kept = insert(&mut store, "kept");

        let mut tx = store.begin().unwrap();
        tx.insert_secret(&record("discarded")).unwrap();
        tx.delete_secret(&kept.id).unwrap();
        tx.rollback().unwrap();

        let keys: Vec<String> = store.list_secrets().unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["kept".to_string()]);
    }

    #[test]
    fn test_drop_without_commit_rolls_back() {
        let mut store = SqliteSecretStore::open_in_memory().unwrap();
        {
            let mut tx = store.begin().unwrap();
            tx.insert_secret(&record("ephemeral")).unwrap();
        }
        assert!(store.find_by_key("ephemeral").unwrap().is_none());
    }

    #[test]
    fn test_update_keeps_identity_and_bumps_updated_at() {
        let mut store = SqliteSecretStore::open_in_memory().unwrap();
        let secret = insert(&mut store, "github");

        let mut changed = SecretRecord::from(&secret);
        changed.notes = None;
        changed.website = Some("github.com".to_string());

        let mut tx = store.begin().unwrap();
        let updated = tx.update_secret(&changed).unwrap();
        tx.commit().unwrap();

        assert_eq!(updated.id, secret.id);
        assert_eq!(updated.created_at, secret.created_at);
        assert!(updated.updated_at >= secret.updated_at);
        assert_eq!(updated.notes, None);
        assert_eq!(updated.website.as_deref(), Some("github.com"));
    }

    #[test]
    fn test_update_and_delete_missing_is_not_found() {
        let mut store = SqliteSecretStore::open_in_memory().unwrap();
        let missing = record("ghost");

        let mut tx = store.begin().unwrap();
        assert!(matches!(
            tx.update_secret(&missing).unwrap_err(),
            MystError::SecretNotFound(id) if id == missing.id
        ));
        assert!(matches!(
            tx.delete_secret(&missing.id).unwrap_err(),
            MystError::SecretNotFound(_)
        ));
    }

    #[test]
    fn test_bulk_lookup_skips_missing_ids() {
        let mut store = SqliteSecretStore::open_in_memory().unwrap();
        let a = insert(&mut store, "a");
        let b = insert(&mut store, "b");

        let tx = store.begin().unwrap();
        let found = tx.get_secrets(&[a.id, Uuid::new_v4(), b.id]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(tx.get_secrets(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_list_ordered_by_key_and_ids() {
        let mut store = SqliteSecretStore::open_in_memory().unwrap();
        let z = insert(&mut store, "zeta");
        let a = insert(&mut store, "Alpha");
        let m = insert(&mut store, "mu");

        let keys: Vec<String> = store.list_secrets().unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["Alpha", "mu", "zeta"]);

        let ids = store.secret_ids().unwrap();
        assert_eq!(ids, HashSet::from([z.id, a.id, m.id]));
    }

    #[test]
    fn test_read_snapshot_leaves_writers_free() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret-store.db");
        let mut reader = SqliteSecretStore::open(&path).unwrap();
        let mut writer = SqliteSecretStore::open(&path).unwrap();
        let secret = insert(&mut writer, "github");

        let snapshot = reader.begin_read().unwrap();
        assert_eq!(snapshot.get_secrets(&[secret.id]).unwrap().len(), 1);

        // An immediate reader would hold the reserved lock here.
        writer.conn.busy_timeout(std::time::Duration::ZERO).unwrap();
        let tx = writer.begin().unwrap();
        tx.rollback().unwrap();

        snapshot.commit().unwrap();
    }

    #[test]
    fn test_reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("secret-store.db");

        let id = {
            let mut store = SqliteSecretStore::open(&path).unwrap();
            insert(&mut store, "github").id
        };

        let store = SqliteSecretStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.get_secret(&id).unwrap().unwrap().key, "github");
        store.check_integrity().unwrap();
    }
}
