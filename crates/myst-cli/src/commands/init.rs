use myst_core::Session;

use crate::app::{prompt_new_passphrase, AppContext};
use crate::cli::InitArgs;
use crate::config::{expand_path, write_config, MystConfig};
use crate::errors::CliError;
use crate::ui::{hint, kv, status, Badge};

/// First-run setup: digest a new master passphrase and write the config.
///
/// Store and index files are created here too, so a broken path fails now
/// rather than on the first `add`.
pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let ui = ctx.ui(false);
    let config_path = ctx.config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}\nHint: Use `myst init --force` to replace it. Secrets sealed under the old passphrase stay unreadable with a new one.",
            config_path.display()
        ))
        .into());
    }

    let store_path = args.store_path.as_deref().map(expand_path).transpose()?;
    let index_path = args.index_path.as_deref().map(expand_path).transpose()?;

    let passphrase = prompt_new_passphrase(args.no_input)?;
    let (_session, digest) = Session::create(&passphrase)?;

    let config = MystConfig::new(digest.to_string(), store_path, index_path);
    let resolved_store = config.store_path()?;
    let resolved_index = config.index_path()?;
    myst_core::SecretManager::open(&resolved_store, &resolved_index)?;
    write_config(&config_path, &config)?;
    tracing::info!(config = %config_path.display(), "initialized myst");

    if !ctx.quiet() {
        println!("{}", status(&ui, Badge::Ok, "Initialized myst"));
        println!("{}", kv(&ui, "Config", &config_path.display().to_string()));
        println!("{}", kv(&ui, "Store", &resolved_store.display().to_string()));
        println!("{}", kv(&ui, "Index", &resolved_index.display().to_string()));
        println!("{}", hint(&ui, "Add a secret with `myst add <key>`."));
    }
    Ok(())
}
