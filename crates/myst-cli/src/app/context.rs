//! Application context for the Myst CLI.
//!
//! Bundles CLI arguments with the lazily-loaded configuration, the opened
//! secret manager and the unlocked session. Built once in `main` and passed
//! to every handler; nothing here is process-global.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use myst_core::{SecretManager, Session};

use crate::cli::Cli;
use crate::config::{read_config, MystConfig};
use crate::errors::CliError;
use crate::ui::UiContext;

use super::passphrase::unlock_session;
use super::resolver::{missing_config_message, resolve_config_path};

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<MystConfig>,
    manager: OnceCell<SecretManager>,
    session: OnceCell<Session>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            manager: OnceCell::new(),
            session: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// UI context for a command, honoring its `--json` flag.
    pub fn ui(&self, json: bool) -> UiContext {
        UiContext::from_env(json, self.cli.no_color, self.cli.quiet)
    }

    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        resolve_config_path(self.cli)
    }

    /// Get the configuration, loading it on first use.
    pub fn config(&self) -> anyhow::Result<&MystConfig> {
        self.config.get_or_try_init(|| {
            let path = self.config_path()?;
            if !path.exists() {
                return Err(CliError::not_found(
                    format!("No config found at {}", path.display()),
                    missing_config_message(),
                )
                .into());
            }
            read_config(&path)
        })
    }

    /// Get the secret manager, opening the store and index on first use.
    pub fn manager(&self) -> anyhow::Result<&SecretManager> {
        self.manager.get_or_try_init(|| {
            let config = self.config()?;
            let store_path = config.store_path()?;
            let index_path = config.index_path()?;
            tracing::debug!(
                store = %store_path.display(),
                index = %index_path.display(),
                "opening secret manager"
            );
            Ok(SecretManager::open(&store_path, &index_path)?)
        })
    }

    /// Get the unlocked session, prompting for the passphrase on first use.
    pub fn session(&self, no_input: bool) -> anyhow::Result<&Session> {
        self.session.get_or_try_init(|| {
            let config = self.config()?;
            unlock_session(&config.security.digested_passphrase, no_input)
        })
    }
}
