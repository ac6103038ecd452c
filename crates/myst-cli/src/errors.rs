//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes. Core errors are classified by
//! [`exit_code_for`] so handlers can simply propagate them with `?`.

use std::fmt;

use myst_core::MystError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, secret)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong passphrase, too many attempts)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Integrity or consistency check failed
    IntegrityFailed { message: String, hint: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } | CliError::IntegrityFailed { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message.
    pub fn auth_failed(message: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: None,
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Create an IntegrityFailed error with message and hint.
    pub fn integrity_failed(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::IntegrityFailed {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::IntegrityFailed { .. } => exit_codes::INTEGRITY_FAILED,
        }
    }
}

/// Exit code for any error surfaced by a handler.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    match err.downcast_ref::<MystError>() {
        Some(core) if core.is_not_found() => exit_codes::NOT_FOUND,
        Some(core) if core.is_validation() => exit_codes::INVALID_INPUT,
        Some(MystError::IncorrectPassphrase | MystError::AuthenticationFailure) => {
            exit_codes::AUTH_FAILED
        }
        Some(MystError::Consistency { .. }) => exit_codes::INTEGRITY_FAILED,
        _ => 1,
    }
}
