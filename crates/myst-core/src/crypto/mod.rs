//! Cryptographic operations for Myst.
//!
//! This module protects secret values and verifies the master passphrase
//! using well-audited libraries:
//! - **PBKDF2-HMAC-SHA256**: key stretching, 100,000 rounds
//! - **AES-256-GCM**: authenticated encryption of each secret value
//!
//! ## Security Model
//!
//! - Every encryption mints a fresh random salt and nonce
//! - The passphrase itself is never persisted; only a derived key + salt
//! - Digest comparison is constant-time
//! - Derived key material is zeroized on drop
//!
//! ## Wire formats
//!
//! - Envelope: `hex(ciphertext || tag)-hex(salt)-hex(nonce)`
//! - Digest: `hex(key)-hex(salt)`

pub mod digest;
pub mod envelope;
pub mod key;
pub mod passphrase;

pub use digest::{digest_passphrase, verify_passphrase, DigestedPassphrase};
pub use envelope::{decrypt, encrypt, Envelope};
pub use key::{derive_key, generate_salt, DerivedKey};
pub use passphrase::validate_passphrase;

use crate::error::{MystError, Result};

/// Salt length in bytes, before hex encoding.
pub const SALT_LENGTH: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// Derived key length in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// PBKDF2 round count.
pub const KDF_ROUNDS: u32 = 100_000;

/// Separator between hex components. Never produced by hex encoding.
pub const SEPARATOR: char = '-';

/// Hex-decode one component of an envelope or digest.
pub(crate) fn decode_part(name: &str, part: &str) -> Result<Vec<u8>> {
    hex::decode(part)
        .map_err(|e| MystError::MalformedEnvelope(format!("{} is not valid hex: {}", name, e)))
}

/// Hex-decode a component that must be exactly `N` bytes.
pub(crate) fn decode_fixed<const N: usize>(name: &str, part: &str) -> Result<[u8; N]> {
    let bytes = decode_part(name, part)?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        MystError::MalformedEnvelope(format!(
            "{} must be {} bytes (got {})",
            name,
            N,
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fixed_checks_length() {
        assert_eq!(decode_fixed::<2>("salt", "abcd").unwrap(), [0xab, 0xcd]);

        let err = decode_fixed::<2>("salt", "abcdef").unwrap_err();
        assert!(err.to_string().contains("salt must be 2 bytes (got 3)"));
    }

    #[test]
    fn test_decode_part_rejects_bad_hex() {
        assert!(matches!(
            decode_part("nonce", "zz"),
            Err(MystError::MalformedEnvelope(_))
        ));
    }
}
