//! Input helpers for secret values and confirmations.

mod input;

pub use input::{confirm, read_secret_value};
