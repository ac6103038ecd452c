//! Output formatting for secrets and maintenance reports.
//!
//! Plaintext values only appear in output when the caller passes one in
//! explicitly (`show --reveal`).

mod json;
mod text;

pub use json::{report_json, secret_json, secrets_json};
pub use text::{print_report, print_secret, print_secret_list};
