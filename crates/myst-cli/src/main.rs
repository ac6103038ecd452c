//! Myst CLI - a local, encrypted secret manager
//!
//! This is the command-line interface for Myst. It resolves configuration,
//! unlocks the master passphrase and hands each command to the core
//! `SecretManager`.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{init, maintenance, misc, secrets};
use crate::constants::env;
use crate::errors::exit_code_for;
use crate::ui::print_error;

fn main() {
    let cli = Cli::parse();
    init_tracing();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        let ui_ctx = ctx.ui(false);
        let error_msg = format!("{}", e);
        let (message, hint) = split_hint(&error_msg);
        let hint = hint.or_else(|| contextual_hint(message));

        print_error(&ui_ctx, message, hint.as_deref());
        std::process::exit(exit_code_for(&e));
    }
}

/// Log to stderr, filtered by `MYST_LOG` (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(env::LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Split an embedded "\nHint: ..." line off an error message.
fn split_hint(error: &str) -> (&str, Option<String>) {
    match error.find("\nHint:") {
        Some(idx) => (&error[..idx], Some(error[idx + 1..].to_string())),
        None => (error, None),
    }
}

/// Hints for core errors that carry none of their own.
fn contextual_hint(error: &str) -> Option<String> {
    let error_lower = error.to_lowercase();

    if error_lower.contains("already exists") {
        return Some("Hint: Keys are unique. Use `myst update <key>` to change it.".to_string());
    }
    if error_lower.contains("secret not found") {
        return Some("Hint: Run `myst list` to see keys and IDs.".to_string());
    }
    if error_lower.contains("consistency error") {
        return Some("Hint: Run `myst reconcile` to repair the search index.".to_string());
    }
    if error_lower.contains("authentication tag mismatch") {
        return Some(
            "Hint: The value was sealed under a different passphrase or was modified.".to_string(),
        );
    }
    if error_lower.contains("index error") {
        return Some("Hint: Run `myst check` to inspect the search index.".to_string());
    }

    None
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => init::handle_init(ctx, args),
        Some(Commands::Add(args)) => secrets::handle_add(ctx, args),
        Some(Commands::Find(args)) => secrets::handle_find(ctx, args),
        Some(Commands::List(args)) => secrets::handle_list(ctx, args),
        Some(Commands::Show(args)) => secrets::handle_show(ctx, args),
        Some(Commands::Update(args)) => secrets::handle_update(ctx, args),
        Some(Commands::Remove(args)) => secrets::handle_remove(ctx, args),
        Some(Commands::Check(args)) => maintenance::handle_check(ctx, args),
        Some(Commands::Reconcile(args)) => maintenance::handle_reconcile(ctx, args),
        Some(Commands::Completions { shell }) => misc::handle_completions(*shell),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
