//! SQLite FTS5 search index.
//!
//! The index lives in its own SQLite file, separate from the secret store,
//! so the two fail independently. Failures here surface as
//! `MystError::Index`, never as store errors.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use super::query::match_expression;
use super::traits::SearchIndex;
use crate::error::{MystError, Result};
use crate::storage::SecretDocument;

/// bm25 column weights: secret_id (unindexed), key, website, notes.
const BM25_WEIGHTS: &str = "0.0, 4.0, 2.0, 1.0";

fn index_error(err: rusqlite::Error) -> MystError {
    MystError::Index(format!("SQLite error: {}", err))
}

fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| MystError::Index(format!("Invalid document ID: {}", e)))
}

/// Full-text index backed by an FTS5 virtual table.
pub struct FtsIndex {
    path: Option<PathBuf>,
    conn: Connection,
}

impl FtsIndex {
    /// Open the index at `path`. A missing index is created empty.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| MystError::Index(format!("Cannot create index directory: {}", e)))?;
        }

        let existed = path.exists();
        let conn = Connection::open(path).map_err(index_error)?;
        Self::init_schema(&conn)?;
        if existed {
            tracing::debug!(path = %path.display(), "opened search index");
        } else {
            tracing::debug!(path = %path.display(), "created empty search index");
        }

        Ok(Self {
            path: Some(path.to_path_buf()),
            conn,
        })
    }

    /// Open a throwaway in-memory index.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(index_error)?;
        Self::init_schema(&conn)?;
        Ok(Self { path: None, conn })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of indexed documents.
    pub fn document_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM secret_index", [], |row| row.get(0))
            .map_err(index_error)?;
        Ok(count as usize)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE VIRTUAL TABLE IF NOT EXISTS secret_index USING fts5(
                secret_id UNINDEXED,
                key,
                website,
                notes,
                tokenize = 'unicode61 remove_diacritics 2'
            );
            "#,
        )
        .map_err(index_error)
    }
}

impl SearchIndex for FtsIndex {
    fn index(&mut self, id: &Uuid, document: &SecretDocument) -> Result<()> {
        let tx = self.conn.transaction().map_err(index_error)?;
        tx.execute(
            "DELETE FROM secret_index WHERE secret_id = ?",
            [id.to_string()],
        )
        .map_err(index_error)?;
        tx.execute(
            "INSERT INTO secret_index (secret_id, key, website, notes) VALUES (?, ?, ?, ?)",
            (
                id.to_string(),
                &document.key,
                document.website.as_deref().unwrap_or(""),
                document.notes.as_deref().unwrap_or(""),
            ),
        )
        .map_err(index_error)?;
        tx.commit().map_err(index_error)
    }

    fn delete(&mut self, id: &Uuid) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM secret_index WHERE secret_id = ?",
                [id.to_string()],
            )
            .map_err(index_error)?;
        Ok(())
    }

    fn search(&self, query: &str) -> Result<Vec<Uuid>> {
        let Some(expression) = match_expression(query) else {
            return Ok(Vec::new());
        };

        let mut stmt = self
            .conn
            .prepare(&format!(
                r#"
                SELECT secret_id
                FROM secret_index
                WHERE secret_index MATCH ?
                ORDER BY bm25(secret_index, {}), key
                "#,
                BM25_WEIGHTS
            ))
            .map_err(index_error)?;
        let rows = stmt
            .query_map([expression], |row| row.get::<_, String>(0))
            .map_err(index_error)?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(parse_id(&row.map_err(index_error)?)?);
        }
        Ok(ids)
    }

    fn document_ids(&self) -> Result<HashSet<Uuid>> {
        let mut stmt = self
            .conn
            .prepare("SELECT secret_id FROM secret_index")
            .map_err(index_error)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(index_error)?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(parse_id(&row.map_err(index_error)?)?);
        }
        Ok(ids)
    }

    fn document(&self, id: &Uuid) -> Result<Option<SecretDocument>> {
        let row = self
            .conn
            .query_row(
                "SELECT key, website, notes FROM secret_index WHERE secret_id = ?",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(index_error)?;

        Ok(row.map(|(key, website, notes)| SecretDocument {
            key,
            website: Some(website).filter(|w| !w.is_empty()),
            notes: Some(notes).filter(|n| !n.is_empty()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(key: &str, website: Option<&str>, notes: Option<&str>) -> SecretDocument {
        SecretDocument {
            key: key.to_string(),
            website: website.map(str::to_string),
            notes: notes.map(str::to_string),
        }
    }

    fn seeded() -> (FtsIndex, Uuid, Uuid, Uuid) {
        let mut index = FtsIndex::open_in_memory().unwrap();
        let github = Uuid::new_v4();
        let deepseek = Uuid::new_v4();
        let google = Uuid::new_v4();
        index
            .index(&github, &doc("test-secret-1", None, Some("github token")))
            .unwrap();
        index
            .index(&deepseek, &doc("test-secret-2", None, Some("for deepseek service")))
            .unwrap();
        index
            .index(&google, &doc("test-secret-3", Some("cloud.google.com"), Some("google cloud")))
            .unwrap();
        (index, github, deepseek, google)
    }

    #[test]
    fn test_search_returns_exact_hits_without_padding() {
        let (index, github, _, _) = seeded();
        assert_eq!(index.search("github").unwrap(), vec![github]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_prefix_tolerant() {
        let (index, _, deepseek, google) = seeded();
        assert_eq!(index.search("DEEP").unwrap(), vec![deepseek]);
        assert_eq!(index.search("goo").unwrap(), vec![google]);
    }

    #[test]
    fn test_search_covers_all_metadata_fields() {
        let (index, _, _, google) = seeded();
        // website only
        assert_eq!(index.search("cloud.google").unwrap()[0], google);
        // key
        assert_eq!(index.search("secret").unwrap().len(), 3);
    }

    #[test]
    fn test_search_ranks_more_matching_terms_first() {
        let (index, github, _, _) = seeded();
        let hits = index.search("github token secret").unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0], github);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let (index, _, _, _) = seeded();
        assert!(index.search("nothing-here").unwrap().is_empty());
        assert!(index.search("  ").unwrap().is_empty());
        assert!(index.search("\"*").unwrap().is_empty());
    }

    #[test]
    fn test_reindex_overwrites_document() {
        let (mut index, github, _, _) = seeded();
        index
            .index(&github, &doc("test-secret-1", None, Some("work token")))
            .unwrap();

        assert!(index.search("github").unwrap().is_empty());
        assert_eq!(index.search("work").unwrap(), vec![github]);
        assert_eq!(index.document_count().unwrap(), 3);
        assert_eq!(
            index.document(&github).unwrap(),
            Some(doc("test-secret-1", None, Some("work token")))
        );
    }

    #[test]
    fn test_key_only_document_matches_and_reads_back() {
        let mut index = FtsIndex::open_in_memory().unwrap();
        let bare = Uuid::new_v4();
        index.index(&bare, &doc("openai-api", None, None)).unwrap();

        assert_eq!(index.search("openai").unwrap(), vec![bare]);
        assert_eq!(index.search("api").unwrap(), vec![bare]);
        assert_eq!(
            index.document(&bare).unwrap(),
            Some(doc("openai-api", None, None))
        );

        // Blank metadata is stored as empty text and reads back as absent.
        index
            .index(&bare, &doc("openai-api", Some(""), Some("")))
            .unwrap();
        assert_eq!(
            index.document(&bare).unwrap(),
            Some(doc("openai-api", None, None))
        );
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (mut index, github, _, _) = seeded();
        index.delete(&github).unwrap();
        index.delete(&github).unwrap();
        index.delete(&Uuid::new_v4()).unwrap();

        assert!(index.search("github").unwrap().is_empty());
        assert!(!index.document_ids().unwrap().contains(&github));
        assert_eq!(index.document(&github).unwrap(), None);
    }

    #[test]
    fn test_cold_start_creates_index_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("secret-index.db");
        assert!(!path.exists());

        let id = Uuid::new_v4();
        {
            let mut index = FtsIndex::open(&path).unwrap();
            assert_eq!(index.document_count().unwrap(), 0);
            index.index(&id, &doc("github", None, None)).unwrap();
        }

        let index = FtsIndex::open(&path).unwrap();
        assert_eq!(index.path(), Some(path.as_path()));
        assert_eq!(index.search("github").unwrap(), vec![id]);
    }
}
