//! Unlocked session context.
//!
//! A [`Session`] is built once per process after the master passphrase has
//! been checked against the stored digest, and is passed explicitly into
//! every manager call that seals or opens a value.

use secrecy::{ExposeSecret, SecretString};

use crate::crypto::{decrypt, encrypt, validate_passphrase, DigestedPassphrase};
use crate::error::{MystError, Result};

/// Proof that the master passphrase was verified, plus the passphrase itself.
pub struct Session {
    passphrase: SecretString,
}

impl Session {
    /// Verify `passphrase` against `digest` and open a session.
    ///
    /// # Errors
    ///
    /// Returns `MystError::IncorrectPassphrase` if verification fails.
    pub fn unlock(passphrase: &str, digest: &DigestedPassphrase) -> Result<Self> {
        if !digest.verify(passphrase) {
            return Err(MystError::IncorrectPassphrase);
        }
        Ok(Self {
            passphrase: SecretString::from(passphrase.to_string()),
        })
    }

    /// Parse a stored digest string, then [`Session::unlock`].
    pub fn unlock_with_digest(passphrase: &str, digest: &str) -> Result<Self> {
        let digest = DigestedPassphrase::parse(digest)?;
        Self::unlock(passphrase, &digest)
    }

    /// First-run setup: validate a new passphrase and digest it.
    ///
    /// The returned digest is what the configuration layer persists.
    pub fn create(passphrase: &str) -> Result<(Self, DigestedPassphrase)> {
        validate_passphrase(passphrase)?;
        let digest = DigestedPassphrase::new(passphrase);
        let session = Self::unlock(passphrase, &digest)?;
        Ok((session, digest))
    }

    /// Encrypt a plaintext value into an envelope.
    pub fn seal(&self, value: &str) -> Result<String> {
        encrypt(self.passphrase.expose_secret(), value)
    }

    /// Decrypt an envelope produced under this passphrase.
    pub fn open(&self, envelope: &str) -> Result<String> {
        decrypt(self.passphrase.expose_secret(), envelope)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}
