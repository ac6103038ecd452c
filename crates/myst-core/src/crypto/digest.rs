//! Master passphrase digests.
//!
//! A digest is a derived key plus the salt it was derived under, encoded as
//! `hex(key)-hex(salt)`. It lets a session prove knowledge of the passphrase
//! without the passphrase ever being stored.

use std::fmt;
use std::str::FromStr;

use subtle::ConstantTimeEq;
use zeroize::ZeroizeOnDrop;

use super::key::{derive_key, derive_key_with_fresh_salt};
use super::{decode_fixed, KEY_LENGTH, SALT_LENGTH, SEPARATOR};
use crate::error::{MystError, Result};

/// Parsed passphrase digest.
///
/// Equality is constant time and the key bytes are zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DigestedPassphrase {
    key: [u8; KEY_LENGTH],
    salt: [u8; SALT_LENGTH],
}

impl DigestedPassphrase {
    /// Digest `passphrase` under a fresh random salt.
    pub fn new(passphrase: &str) -> Self {
        let (key, salt) = derive_key_with_fresh_salt(passphrase);
        Self {
            key: *key.as_bytes(),
            salt,
        }
    }

    /// Parse `hex(key)-hex(salt)`.
    pub fn parse(value: &str) -> Result<Self> {
        let (key_hex, salt_hex) = value
            .split_once(SEPARATOR)
            .ok_or_else(|| MystError::MalformedEnvelope("digest has no separator".to_string()))?;

        let key = decode_fixed::<KEY_LENGTH>("digest key", key_hex)?;
        let salt = decode_fixed::<SALT_LENGTH>("digest salt", salt_hex)?;

        Ok(Self { key, salt })
    }

    /// Check `passphrase` against this digest in constant time.
    pub fn verify(&self, passphrase: &str) -> bool {
        let candidate = derive_key(passphrase, &self.salt);
        candidate.as_bytes()[..].ct_eq(&self.key[..]).into()
    }
}

impl PartialEq for DigestedPassphrase {
    fn eq(&self, other: &Self) -> bool {
        (self.key[..].ct_eq(&other.key[..]) & self.salt[..].ct_eq(&other.salt[..])).into()
    }
}

impl Eq for DigestedPassphrase {}

impl fmt::Display for DigestedPassphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            hex::encode(self.key),
            SEPARATOR,
            hex::encode(self.salt)
        )
    }
}

impl fmt::Debug for DigestedPassphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestedPassphrase")
            .field("key", &"[REDACTED]")
            .field("salt", &hex::encode(self.salt))
            .finish()
    }
}

impl FromStr for DigestedPassphrase {
    type Err = MystError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Produce the `hex(key)-hex(salt)` digest of a passphrase.
pub fn digest_passphrase(passphrase: &str) -> String {
    DigestedPassphrase::new(passphrase).to_string()
}

/// Verify a passphrase against a stored digest string.
///
/// Fails closed: a digest that cannot be parsed verifies nothing.
pub fn verify_passphrase(passphrase: &str, digest: &str) -> bool {
    match DigestedPassphrase::parse(digest) {
        Ok(parsed) => parsed.verify(passphrase),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_correct_passphrase() {
        let digest = digest_passphrase("master-passphrase");
        assert!(verify_passphrase("master-passphrase", &digest));
    }

    #[test]
    fn test_verify_wrong_passphrase() {
        let digest = digest_passphrase("master-passphrase");
        assert!(!verify_passphrase("Master-passphrase", &digest));
        assert!(!verify_passphrase("", &digest));
    }

    #[test]
    fn test_digest_format() {
        let digest = digest_passphrase("master-passphrase");
        let (key, salt) = digest.split_once('-').unwrap();

        assert_eq!(key.len(), KEY_LENGTH * 2);
        assert_eq!(salt.len(), SALT_LENGTH * 2);
        assert_eq!(DigestedPassphrase::parse(&digest).unwrap().to_string(), digest);
    }

    #[test]
    fn test_digests_are_salted() {
        assert_ne!(
            digest_passphrase("master-passphrase"),
            digest_passphrase("master-passphrase")
        );
    }

    #[test]
    fn test_malformed_digest_fails_closed() {
        let digest = digest_passphrase("master-passphrase");
        let (key, salt) = digest.split_once('-').unwrap();

        for bad in [
            String::new(),
            key.to_string(),
            format!("{}-{}-00", key, salt),
            format!("{}-{}", &key[2..], salt),
            format!("xx{}-{}", &key[2..], salt),
        ] {
            assert!(!verify_passphrase("master-passphrase", &bad), "{bad}");
        }
    }

    #[test]
    fn test_equality_compares_key_and_salt() {
        let digest = DigestedPassphrase::new("master-passphrase");
        let reparsed = DigestedPassphrase::parse(&digest.to_string()).unwrap();
        assert!(digest == reparsed);

        // Same passphrase, different salt.
        assert!(digest != DigestedPassphrase::new("master-passphrase"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let digest = DigestedPassphrase::new("master-passphrase");
        let key_hex = digest.to_string()[..16].to_string();
        assert!(!format!("{:?}", digest).contains(&key_hex));
    }
}
