//! Application-level utilities for the Myst CLI.
//!
//! This module provides:
//! - The per-invocation context (config, session, manager)
//! - Path resolution for the config file and secret lookup by key or ID
//! - Passphrase unlocking with retry logic

mod context;
mod passphrase;
mod resolver;

pub use context::AppContext;
pub use passphrase::prompt_new_passphrase;
pub use resolver::resolve_secret;
