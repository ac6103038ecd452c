//! Config path resolution and secret lookup.

use std::path::PathBuf;

use myst_core::{Secret, SecretManager};
use uuid::Uuid;

use crate::cli::Cli;
use crate::config::{default_config_path, expand_path};
use crate::errors::CliError;

/// Shortest ID prefix accepted in place of a full UUID.
const MIN_ID_PREFIX: usize = 4;

/// Resolve the config file path: `--config` / `MYST_CONFIG`, then the default.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match cli.config.as_deref().filter(|v| !v.trim().is_empty()) {
        Some(value) => expand_path(value),
        None => default_config_path(),
    }
}

pub fn missing_config_message() -> String {
    "Run:\n  myst init\n\nOr point at an existing config:\n  MYST_CONFIG=/path/to/config.toml myst list"
        .to_string()
}

/// Find a secret by exact key, full ID, or unambiguous ID prefix.
pub fn resolve_secret(manager: &SecretManager, target: &str) -> anyhow::Result<Secret> {
    if let Some(secret) = manager.find_by_key(target)? {
        return Ok(secret);
    }
    if let Ok(id) = Uuid::parse_str(target) {
        return Ok(manager.get_secret(&id)?);
    }

    let prefix = target.trim().to_ascii_lowercase();
    if prefix.len() >= MIN_ID_PREFIX && prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        let mut matches: Vec<Secret> = manager
            .list_secrets()?
            .into_iter()
            .filter(|secret| secret.id.to_string().starts_with(&prefix))
            .collect();
        match matches.len() {
            0 => {}
            1 => return Ok(matches.remove(0)),
            n => {
                return Err(CliError::invalid_input(format!(
                    "ID prefix \"{}\" is ambiguous ({} matches); use more characters",
                    prefix, n
                ))
                .into())
            }
        }
    }

    Err(CliError::not_found(
        format!("Secret not found: {}", target),
        "Hint: Run `myst list` to see keys and IDs.",
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use myst_core::{NewSecret, Session};

    fn manager_with_github() -> (SecretManager, Secret) {
        let manager = SecretManager::open_in_memory().unwrap();
        let (session, _) = Session::create("master-passphrase").unwrap();
        let secret = manager
            .add_secret(&session, NewSecret::new("github", "tok123"))
            .unwrap();
        (manager, secret)
    }

    #[test]
    fn test_resolve_by_key_and_id() {
        let (manager, secret) = manager_with_github();
        assert_eq!(resolve_secret(&manager, "github").unwrap().id, secret.id);
        assert_eq!(
            resolve_secret(&manager, &secret.id.to_string()).unwrap().id,
            secret.id
        );
        let prefix: String = secret.id.to_string().chars().take(8).collect();
        assert_eq!(resolve_secret(&manager, &prefix).unwrap().id, secret.id);
    }

    #[test]
    fn test_unknown_target_is_not_found() {
        let (manager, _) = manager_with_github();
        let err = resolve_secret(&manager, "gitlab").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::NotFound { .. })
        ));
    }
}
