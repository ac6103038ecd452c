//! Secret field validation.
//!
//! Runs before any write, so a rejected secret never touches either store.

use crate::error::{MystError, Result};
use crate::storage::types::normalize_optional;

/// Maximum characters in a secret key.
pub const MAX_KEY_CHARS: usize = 128;

/// Maximum bytes in a plaintext secret value.
pub const MAX_VALUE_BYTES: usize = 64 * 1024;

/// Maximum bytes in website or notes.
pub const MAX_METADATA_BYTES: usize = 4 * 1024;

/// Normalize and validate a secret key.
///
/// - Trims surrounding whitespace
/// - Rejects empty keys and keys with control characters
/// - Enforces the length limit
pub fn normalize_key(key: &str) -> Result<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(MystError::Validation(
            "Secret key cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_KEY_CHARS {
        return Err(MystError::Validation(format!(
            "Secret key too long (max {} characters)",
            MAX_KEY_CHARS
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(MystError::Validation(
            "Secret key contains control characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a plaintext value. Values are stored verbatim, never trimmed.
pub fn validate_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(MystError::Validation(
            "Secret value cannot be empty".to_string(),
        ));
    }
    if value.len() > MAX_VALUE_BYTES {
        return Err(MystError::Validation(format!(
            "Secret value too large (max {} bytes)",
            MAX_VALUE_BYTES
        )));
    }
    Ok(())
}

/// Normalize optional metadata (website, notes): blank means absent.
pub fn normalize_metadata(field: &str, value: Option<&str>) -> Result<Option<String>> {
    let normalized = normalize_optional(value);
    if let Some(ref v) = normalized {
        if v.len() > MAX_METADATA_BYTES {
            return Err(MystError::Validation(format!(
                "{} too long (max {} bytes)",
                field, MAX_METADATA_BYTES
            )));
        }
    }
    Ok(normalized)
}
