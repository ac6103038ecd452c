//! Passphrase handling with retry logic.

use std::io::IsTerminal;

use dialoguer::Password;
use myst_core::crypto::{validate_passphrase, DigestedPassphrase};
use myst_core::{MystError, Session};

use crate::constants::{env, MAX_PASSPHRASE_ATTEMPTS};
use crate::errors::CliError;

fn env_passphrase() -> Option<String> {
    std::env::var(env::PASSPHRASE)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn prompt_passphrase() -> anyhow::Result<String> {
    Password::new()
        .with_prompt("Master passphrase")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Unlock a session against the configured digest.
///
/// `MYST_PASSPHRASE` is tried once; otherwise an interactive prompt allows
/// a few attempts.
pub fn unlock_session(digest: &str, no_input: bool) -> anyhow::Result<Session> {
    let digest = DigestedPassphrase::parse(digest).map_err(|e| {
        CliError::integrity_failed(
            format!("Stored passphrase digest is invalid: {}", e),
            "Hint: Restore your config file or run `myst init --force`.",
        )
    })?;

    if let Some(passphrase) = env_passphrase() {
        return match Session::unlock(&passphrase, &digest) {
            Ok(session) => Ok(session),
            Err(MystError::IncorrectPassphrase) => {
                Err(CliError::auth_failed("Incorrect passphrase.").into())
            }
            Err(err) => Err(err.into()),
        };
    }

    let interactive = std::io::stdin().is_terminal() && !no_input;
    if !interactive {
        return Err(CliError::auth_failed_with_hint(
            "No passphrase provided and no TTY available.",
            format!("Hint: Set {}.", env::PASSPHRASE),
        )
        .into());
    }

    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let passphrase = prompt_passphrase()?;
        match Session::unlock(&passphrase, &digest) {
            Ok(session) => return Ok(session),
            Err(MystError::IncorrectPassphrase) => {
                let remaining = MAX_PASSPHRASE_ATTEMPTS.saturating_sub(attempts);
                if remaining == 0 {
                    return Err(CliError::auth_failed_with_hint(
                        "Too many failed passphrase attempts.",
                        "Hint: A forgotten master passphrase cannot be recovered; stored values stay sealed.",
                    )
                    .into());
                }
                eprintln!(
                    "Incorrect passphrase. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Ask for a new master passphrase (with confirmation), or read `MYST_PASSPHRASE`.
pub fn prompt_new_passphrase(no_input: bool) -> anyhow::Result<String> {
    if let Some(value) = env_passphrase() {
        validate_passphrase(&value)
            .map_err(|e| CliError::invalid_input(format!("Passphrase does not meet requirements: {}", e)))?;
        return Ok(value);
    }
    if no_input || !std::io::stdin().is_terminal() {
        return Err(CliError::invalid_input(format!(
            "No passphrase provided and no TTY available. Set {}.",
            env::PASSPHRASE
        ))
        .into());
    }
    loop {
        let passphrase = Password::new()
            .with_prompt("New master passphrase")
            .with_confirmation("Confirm passphrase", "Passphrases do not match")
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))?;
        if let Err(err) = validate_passphrase(&passphrase) {
            eprintln!("Passphrase does not meet requirements: {}", err);
            continue;
        }
        return Ok(passphrase);
    }
}
