//! Human-readable output formatting.

use myst_core::{ConsistencyReport, Secret};

use crate::ui::{kv, status, table, Badge, UiContext};

fn short_id(secret: &Secret) -> String {
    secret.id.to_string().chars().take(8).collect()
}

/// Print secrets as a table, or one key per line in quiet mode.
pub fn print_secret_list(ctx: &UiContext, secrets: &[Secret]) {
    if ctx.quiet {
        for secret in secrets {
            println!("{}", secret.key);
        }
        return;
    }
    if secrets.is_empty() {
        println!("No secrets found.");
        return;
    }

    let rows: Vec<Vec<String>> = secrets
        .iter()
        .map(|secret| {
            vec![
                short_id(secret),
                secret.key.clone(),
                secret.website.clone().unwrap_or_default(),
                secret.notes.clone().unwrap_or_default(),
                secret.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        table(ctx, &["ID", "KEY", "WEBSITE", "NOTES", "UPDATED"], &rows)
    );
}

/// Print a single secret; `value` is printed only when revealed.
pub fn print_secret(ctx: &UiContext, secret: &Secret, value: Option<&str>) {
    if ctx.quiet {
        if let Some(value) = value {
            println!("{}", value);
        }
        return;
    }

    println!("{}", kv(ctx, "ID", &secret.id.to_string()));
    println!("{}", kv(ctx, "Key", &secret.key));
    if let Some(website) = &secret.website {
        println!("{}", kv(ctx, "Website", website));
    }
    if let Some(notes) = &secret.notes {
        println!("{}", kv(ctx, "Notes", notes));
    }
    println!("{}", kv(ctx, "Created", &secret.created_at.to_rfc3339()));
    println!("{}", kv(ctx, "Updated", &secret.updated_at.to_rfc3339()));
    match value {
        Some(value) => println!("{}", kv(ctx, "Value", value)),
        None => println!("{}", kv(ctx, "Value", "******** (use --reveal)")),
    }
}

/// Print a consistency report.
pub fn print_report(ctx: &UiContext, report: &ConsistencyReport, repaired: bool) {
    if ctx.quiet {
        return;
    }
    println!("{}", kv(ctx, "Secrets", &report.secrets.to_string()));
    println!("{}", kv(ctx, "Indexed", &report.documents.to_string()));

    let groups = [
        ("missing from index", &report.missing_from_index),
        ("orphaned in index", &report.orphaned_in_index),
        ("stale in index", &report.stale_documents),
    ];
    for (label, ids) in groups {
        if ids.is_empty() {
            continue;
        }
        let badge = if repaired { Badge::Info } else { Badge::Warn };
        let verb = if repaired { "repaired" } else { "found" };
        println!(
            "{}",
            status(ctx, badge, &format!("{} {} {}", ids.len(), label, verb))
        );
        for id in ids {
            println!("  {}", id);
        }
    }

    if report.is_consistent() {
        println!("{}", status(ctx, Badge::Ok, "Store and index are consistent"));
    } else if repaired {
        println!("{}", status(ctx, Badge::Ok, "Search index repaired"));
    }
}
