//! Authenticated encryption of secret values.
//!
//! A sealed value travels as an [`Envelope`]: ciphertext with its GCM tag,
//! the salt its key was derived under, and the nonce. The string form is
//! `hex(ciphertext || tag)-hex(salt)-hex(nonce)`.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use super::key::{derive_key, derive_key_with_fresh_salt, DerivedKey};
use super::{decode_fixed, decode_part, NONCE_LENGTH, SALT_LENGTH, SEPARATOR, TAG_LENGTH};
use crate::error::{MystError, Result};

/// Parsed form of an encrypted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Ciphertext followed by the 16-byte authentication tag
    pub ciphertext: Vec<u8>,
    pub salt: [u8; SALT_LENGTH],
    pub nonce: [u8; NONCE_LENGTH],
}

impl Envelope {
    /// Parse the wire form, checking part count, hex encoding and sizes.
    ///
    /// Never runs key derivation; a malformed envelope fails fast.
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(MystError::MalformedEnvelope(format!(
                "expected 3 parts, found {}",
                parts.len()
            )));
        }

        let ciphertext = decode_part("ciphertext", parts[0])?;
        if ciphertext.len() < TAG_LENGTH {
            return Err(MystError::MalformedEnvelope(format!(
                "ciphertext shorter than the {}-byte tag",
                TAG_LENGTH
            )));
        }
        let salt = decode_fixed::<SALT_LENGTH>("salt", parts[1])?;
        let nonce = decode_fixed::<NONCE_LENGTH>("nonce", parts[2])?;

        Ok(Self {
            ciphertext,
            salt,
            nonce,
        })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            hex::encode(&self.ciphertext),
            hex::encode(self.salt),
            hex::encode(self.nonce),
            sep = SEPARATOR
        )
    }
}

fn cipher_for(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt `plaintext` under a key freshly derived from `passphrase`.
///
/// Every call draws a new salt and nonce, so encrypting the same value twice
/// yields two different envelopes.
pub fn encrypt(passphrase: &str, plaintext: &str) -> Result<String> {
    let (key, salt) = derive_key_with_fresh_salt(passphrase);

    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher_for(&key)
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|e| MystError::Crypto(format!("AES-GCM seal failed: {}", e)))?;

    Ok(Envelope {
        ciphertext,
        salt,
        nonce,
    }
    .to_string())
}

/// Decrypt an envelope produced by [`encrypt`].
///
/// # Errors
///
/// - `MystError::MalformedEnvelope` if the envelope cannot be parsed
/// - `MystError::AuthenticationFailure` if the tag check fails (wrong
///   passphrase or tampered data); no plaintext is returned in that case
pub fn decrypt(passphrase: &str, envelope: &str) -> Result<String> {
    let envelope = Envelope::parse(envelope)?;
    let key = derive_key(passphrase, &envelope.salt);

    let plaintext = Zeroizing::new(
        cipher_for(&key)
            .decrypt(
                Nonce::from_slice(&envelope.nonce),
                envelope.ciphertext.as_slice(),
            )
            .map_err(|_| MystError::AuthenticationFailure)?,
    );

    String::from_utf8(plaintext.to_vec())
        .map_err(|_| MystError::Crypto("Decrypted value is not valid UTF-8".to_string()))
}
