use crate::app::AppContext;
use crate::cli::MaintenanceArgs;
use crate::errors::CliError;
use crate::output::{print_report, report_json};

/// Verify store integrity and compare the store with the index.
///
/// Exits with the integrity code when the two disagree.
pub fn handle_check(ctx: &AppContext, args: &MaintenanceArgs) -> anyhow::Result<()> {
    let report = ctx.manager()?.verify_consistency().map_err(|err| {
        CliError::integrity_failed(
            format!("Integrity check failed: {}", err),
            "Hint: Restore the secret store from a backup.",
        )
    })?;

    let ui = ctx.ui(args.json);
    if ui.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&report)?)?);
    } else {
        print_report(&ui, &report, false);
    }

    if !report.is_consistent() {
        return Err(CliError::integrity_failed(
            "Store and search index disagree",
            "Hint: Run `myst reconcile` to repair the index.",
        )
        .into());
    }
    Ok(())
}

/// Repair the index so it mirrors the store.
pub fn handle_reconcile(ctx: &AppContext, args: &MaintenanceArgs) -> anyhow::Result<()> {
    let report = ctx.manager()?.reconcile()?;

    let ui = ctx.ui(args.json);
    if ui.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&report)?)?);
    } else {
        print_report(&ui, &report, true);
    }
    Ok(())
}
