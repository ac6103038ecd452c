//! Rendering helpers: tables, key/value lines, hints, errors.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{ContentArrangement, Table};
use owo_colors::OwoColorize;

use super::context::UiContext;
use super::theme::Badge;

/// Render rows as a table with a header line.
pub fn table(ctx: &UiContext, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    if ctx.color {
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS);
    } else {
        table.load_preset(ASCII_MARKDOWN);
    }
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.to_vec());
    for row in rows {
        table.add_row(row.clone());
    }
    table.to_string()
}

/// A `label: value` line with the label dimmed.
pub fn kv(ctx: &UiContext, label: &str, value: &str) -> String {
    let label = format!("{}:", label);
    if ctx.color {
        format!("{:<10} {}", label.dimmed(), value)
    } else {
        format!("{:<10} {}", label, value)
    }
}

/// A `[BADGE] message` status line.
pub fn status(ctx: &UiContext, badge: Badge, message: &str) -> String {
    format!("{} {}", badge.paint(ctx.color), message)
}

/// A dimmed follow-up hint.
pub fn hint(ctx: &UiContext, text: &str) -> String {
    let line = format!("Hint: {}", text);
    if ctx.color {
        line.dimmed().to_string()
    } else {
        line
    }
}

/// Print an error and optional hint to stderr.
pub fn print_error(ctx: &UiContext, message: &str, hint_text: Option<&str>) {
    eprintln!("{} {}", Badge::Err.paint(ctx.color), message);
    if let Some(text) = hint_text {
        eprintln!("{}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_table_has_headers_and_rows() {
        let ctx = UiContext::plain();
        let rendered = table(
            &ctx,
            &["KEY", "WEBSITE"],
            &[vec!["github".to_string(), "github.com".to_string()]],
        );
        assert!(rendered.contains("KEY"));
        assert!(rendered.contains("github.com"));
    }

    #[test]
    fn test_kv_plain() {
        let ctx = UiContext::plain();
        assert_eq!(kv(&ctx, "Key", "github"), "Key:       github");
    }

    #[test]
    fn test_status_plain() {
        let ctx = UiContext::plain();
        assert_eq!(status(&ctx, Badge::Ok, "done"), "[OK] done");
    }
}
