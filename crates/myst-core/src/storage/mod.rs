//! Relational storage for secret records.
//!
//! The store is one of the two independent failure domains the manager
//! keeps consistent; the other is the search index.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::{SqliteSecretStore, SqliteTransaction};
pub use traits::{SecretStore, StoreTransaction};
pub use types::{NewSecret, Secret, SecretDocument, SecretRecord, SecretUpdate};
