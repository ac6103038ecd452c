//! Secret commands: add, find, list, show, update, remove.

use myst_core::{NewSecret, SecretUpdate};

use crate::app::{resolve_secret, AppContext};
use crate::cli::{AddArgs, FindArgs, ListArgs, RemoveArgs, ShowArgs, UpdateArgs};
use crate::errors::CliError;
use crate::helpers::{confirm, read_secret_value};
use crate::output::{print_secret, print_secret_list, secret_json, secrets_json};
use crate::ui::{status, Badge};

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    let manager = ctx.manager()?;
    let session = ctx.session(args.no_input)?;
    let value = read_secret_value(args.value.clone(), args.no_input)?;

    let mut new = NewSecret::new(args.key.clone(), value);
    if let Some(website) = &args.website {
        new = new.with_website(website.clone());
    }
    if let Some(notes) = &args.notes {
        new = new.with_notes(notes.clone());
    }

    let secret = manager.add_secret(session, new)?;
    if ctx.quiet() {
        println!("{}", secret.id);
    } else {
        let ui = ctx.ui(false);
        println!(
            "{}",
            status(&ui, Badge::Ok, &format!("Added {} ({})", secret.key, secret.id))
        );
    }
    Ok(())
}

pub fn handle_find(ctx: &AppContext, args: &FindArgs) -> anyhow::Result<()> {
    let manager = ctx.manager()?;
    let query = args.query.join(" ");
    let mut secrets = manager.find_secrets(&query)?;
    if let Some(limit) = args.limit {
        secrets.truncate(limit);
    }

    let ui = ctx.ui(args.json);
    if ui.json {
        println!("{}", serde_json::to_string_pretty(&secrets_json(&secrets))?);
    } else {
        print_secret_list(&ui, &secrets);
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let secrets = ctx.manager()?.list_secrets()?;
    let ui = ctx.ui(args.json);
    if ui.json {
        println!("{}", serde_json::to_string_pretty(&secrets_json(&secrets))?);
    } else {
        print_secret_list(&ui, &secrets);
    }
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let manager = ctx.manager()?;
    let secret = resolve_secret(manager, &args.target)?;
    let value = if args.reveal {
        let session = ctx.session(args.no_input)?;
        Some(session.open(&secret.encrypted_value)?)
    } else {
        None
    };

    let ui = ctx.ui(args.json);
    if ui.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&secret_json(&secret, value.as_deref()))?
        );
    } else {
        print_secret(&ui, &secret, value.as_deref());
    }
    Ok(())
}

pub fn handle_update(ctx: &AppContext, args: &UpdateArgs) -> anyhow::Result<()> {
    let manager = ctx.manager()?;
    let secret = resolve_secret(manager, &args.target)?;

    let mut update = SecretUpdate::new();
    if args.value.is_some() || args.prompt_value {
        update = update.value(read_secret_value(args.value.clone(), args.no_input)?);
    }
    if let Some(website) = &args.website {
        update = update.website(website.clone());
    }
    if let Some(notes) = &args.notes {
        update = update.notes(notes.clone());
    }
    if update.is_empty() {
        return Err(CliError::invalid_input(
            "Nothing to update. Pass --value, --prompt-value, --website or --notes.",
        )
        .into());
    }

    let session = ctx.session(args.no_input)?;
    let updated = manager.update_secret(session, &secret.id, update)?;
    if !ctx.quiet() {
        let ui = ctx.ui(false);
        println!(
            "{}",
            status(&ui, Badge::Ok, &format!("Updated {}", updated.key))
        );
    }
    Ok(())
}

pub fn handle_remove(ctx: &AppContext, args: &RemoveArgs) -> anyhow::Result<()> {
    let manager = ctx.manager()?;
    let secret = resolve_secret(manager, &args.target)?;

    if !args.yes && !confirm(&format!("Permanently remove \"{}\"?", secret.key))? {
        return Err(CliError::invalid_input(
            "Removal not confirmed.\nHint: Pass --yes to remove without a prompt.",
        )
        .into());
    }

    let removed = manager.remove_secret(&secret.id)?;
    if !ctx.quiet() {
        let ui = ctx.ui(false);
        println!(
            "{}",
            status(&ui, Badge::Ok, &format!("Removed {}", removed.key))
        );
    }
    Ok(())
}
