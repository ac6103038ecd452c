//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, used by clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, secret).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments, including rejected secret fields.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase, too many attempts).
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity or store/index consistency check failed.
    pub const INTEGRITY_FAILED: i32 = 6;
}

/// Environment variables read by the CLI.
pub mod env {
    /// Master passphrase for non-interactive use.
    pub const PASSPHRASE: &str = "MYST_PASSPHRASE";

    /// Log filter (tracing `EnvFilter` syntax).
    pub const LOG: &str = "MYST_LOG";
}

/// Directory name under the XDG config and data homes.
pub const APP_DIR: &str = "myst";

pub const CONFIG_FILE: &str = "config.toml";
pub const STORE_FILE: &str = "secret-store.db";
pub const INDEX_FILE: &str = "secret-index.db";

/// Passphrase prompts before giving up.
pub const MAX_PASSPHRASE_ATTEMPTS: u32 = 3;
