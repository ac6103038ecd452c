//! UI primitives for the Myst CLI.
//!
//! - **Context**: environment detection (TTY, color, json, quiet)
//! - **Theme**: status badges
//! - **Render**: tables, key/value lines, hints, errors

mod context;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use render::{hint, kv, print_error, status, table};
pub use theme::Badge;
