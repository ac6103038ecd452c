//! Secret row type for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{MystError, Result};
use crate::storage::types::Secret;

/// Column list matching the field order of [`SecretRow::from_row`].
pub const SECRET_COLUMNS: &str =
    "id, key, encrypted_value, website, notes, created_at, updated_at";

/// Raw row data from the secrets table, before parsing into domain types.
#[derive(Debug)]
pub struct SecretRow {
    pub id: String,
    pub key: String,
    pub encrypted_value: String,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl SecretRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            key: row.get(1)?,
            encrypted_value: row.get(2)?,
            website: row.get(3)?,
            notes: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| MystError::Storage(format!("Invalid {} timestamp: {}", column, e)))?
        .with_timezone(&Utc))
}

impl TryFrom<SecretRow> for Secret {
    type Error = MystError;

    fn try_from(row: SecretRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| MystError::Storage(format!("Invalid secret UUID: {}", e)))?;
        let created_at = parse_timestamp(&row.created_at, "created_at")?;
        let updated_at = parse_timestamp(&row.updated_at, "updated_at")?;

        Ok(Secret {
            id,
            key: row.key,
            encrypted_value: row.encrypted_value,
            website: row.website,
            notes: row.notes,
            created_at,
            updated_at,
        })
    }
}
