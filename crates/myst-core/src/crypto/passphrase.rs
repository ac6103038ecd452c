//! Master passphrase rules.
//!
//! Checked once, when a new master passphrase is digested during setup.
//! Verification of an existing passphrase never applies these rules, so a
//! digest created under older rules keeps working.

use crate::error::{MystError, Result};

/// Minimum passphrase length in characters (not bytes).
pub const MIN_PASSPHRASE_CHARS: usize = 8;

/// Validate a new master passphrase.
///
/// Rejects blank passphrases, passphrases shorter than
/// [`MIN_PASSPHRASE_CHARS`] characters, and passphrases containing control
/// characters (a stray newline from a pasted value is the usual culprit).
///
/// ```
/// use myst_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("correct horse battery").is_ok());
/// assert!(validate_passphrase("short").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(MystError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let chars = passphrase.chars().count();
    if chars < MIN_PASSPHRASE_CHARS {
        return Err(MystError::InvalidInput(format!(
            "Passphrase must be at least {} characters long (got {})",
            MIN_PASSPHRASE_CHARS, chars
        )));
    }

    if passphrase.chars().any(char::is_control) {
        return Err(MystError::InvalidInput(
            "Passphrase cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_reasonable_passphrases() {
        assert!(validate_passphrase("12345678").is_ok());
        assert!(validate_passphrase("with spaces and symbols !@#").is_ok());
    }

    #[test]
    fn test_rejects_blank() {
        assert!(validate_passphrase("").is_err());
        assert!(validate_passphrase("          ").is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        // 7 characters, 14 bytes
        assert!(validate_passphrase("ééééééé").is_err());
        assert!(validate_passphrase("éééééééé").is_ok());

        let err = validate_passphrase("short").unwrap_err();
        assert!(err.to_string().contains("at least 8 characters"));
    }

    #[test]
    fn test_rejects_control_characters() {
        assert!(validate_passphrase("passphrase\n").is_err());
        assert!(validate_passphrase("pass\tphrase").is_err());
    }
}
