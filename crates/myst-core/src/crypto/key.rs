//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Keys are stretched from the passphrase with a fixed round count so that
//! the same passphrase and salt always produce the same key.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use super::{KDF_ROUNDS, KEY_LENGTH, SALT_LENGTH};

/// A cryptographic key derived from a passphrase.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate cipher operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Generate a random salt from the OS CSPRNG.
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a key from a passphrase and salt.
///
/// Deterministic: the same passphrase and salt always yield the same key,
/// which is what lets `decrypt` and `verify_passphrase` re-derive it.
///
/// # Examples
///
/// ```
/// use myst_core::crypto::{derive_key, generate_salt};
///
/// let salt = generate_salt();
/// let key = derive_key("my-passphrase", &salt);
/// assert_eq!(key.as_bytes(), derive_key("my-passphrase", &salt).as_bytes());
/// ```
pub fn derive_key(passphrase: &str, salt: &[u8]) -> DerivedKey {
    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, KDF_ROUNDS, &mut key_bytes);
    DerivedKey::from_bytes(key_bytes)
}

/// Derive a key under a freshly generated salt, returning both.
pub fn derive_key_with_fresh_salt(passphrase: &str) -> (DerivedKey, [u8; SALT_LENGTH]) {
    let salt = generate_salt();
    (derive_key(passphrase, &salt), salt)
}
