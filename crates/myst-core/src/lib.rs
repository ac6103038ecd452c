//! # Myst Core
//!
//! Core library for Myst - a local, single-user secret manager.
//!
//! Secret values are sealed under a master passphrase and stored in a
//! relational store; their metadata is mirrored into an independent
//! full-text index. This crate owns the encryption scheme and the protocol
//! that keeps the two stores consistent, independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, value envelopes, passphrase digests
//! - **session**: the unlocked-passphrase context passed into every call
//! - **storage**: relational store trait and SQLite implementation
//! - **search**: search index trait and SQLite FTS5 implementation
//! - **manager**: add/update/remove/find protocol with compensation
//! - **validation**: field rules applied before any write

pub mod crypto;
pub mod error;
pub mod fs;
pub mod manager;
pub mod search;
pub mod session;
pub mod storage;
pub mod validation;

pub use error::{MystError, Result};
pub use manager::{ConsistencyReport, SecretManager};
pub use search::{FtsIndex, SearchIndex};
pub use session::Session;
pub use storage::{
    NewSecret, Secret, SecretDocument, SecretStore, SecretUpdate, SqliteSecretStore,
    StoreTransaction,
};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
