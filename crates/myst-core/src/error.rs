//! Error types for Myst core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Myst operations.
pub type Result<T> = std::result::Result<T, MystError>;

/// Core error type for Myst operations.
#[derive(Debug, Error)]
pub enum MystError {
    /// Input rejected before any write (empty key/value, bad field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A live secret already uses this key
    #[error("A secret with key \"{0}\" already exists")]
    DuplicateKey(String),

    /// Envelope or digest has the wrong shape or encoding
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Authentication tag check failed (wrong passphrase or tampered data)
    #[error("Decryption failed: authentication tag mismatch")]
    AuthenticationFailure,

    /// Passphrase does not match the stored digest
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// Other cryptographic failure (cipher setup, key derivation)
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Relational store error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite error raised by the relational store
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Secret not found by ID
    #[error("Secret not found: {0}")]
    SecretNotFound(Uuid),

    /// Generic resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Search index unreachable or query failure
    #[error("Index error: {0}")]
    Index(String),

    /// The two stores disagree and compensation could not restore them
    #[error("Consistency error for secret {id}: {detail}")]
    Consistency { id: Uuid, detail: String },

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl MystError {
    /// True for errors raised before any write was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MystError::Validation(_) | MystError::DuplicateKey(_) | MystError::InvalidInput(_)
        )
    }

    /// True for decryption and passphrase failures.
    pub fn is_crypto(&self) -> bool {
        matches!(
            self,
            MystError::MalformedEnvelope(_)
                | MystError::AuthenticationFailure
                | MystError::IncorrectPassphrase
                | MystError::Crypto(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MystError::SecretNotFound(_) | MystError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(MystError::DuplicateKey("github".to_string()).is_validation());
        assert!(MystError::Validation("empty".to_string()).is_validation());
        assert!(MystError::AuthenticationFailure.is_crypto());
        assert!(MystError::MalformedEnvelope("parts".to_string()).is_crypto());
        assert!(MystError::SecretNotFound(Uuid::nil()).is_not_found());
        assert!(!MystError::Index("down".to_string()).is_not_found());
    }

    #[test]
    fn test_duplicate_key_message_names_key() {
        let err = MystError::DuplicateKey("github".to_string());
        assert!(err.to_string().contains("\"github\""));
    }
}
