//! Reading secret values and confirmations.

use std::io::{self, IsTerminal, Read};

use dialoguer::{Confirm, Password};

use crate::errors::CliError;

/// Read a secret value from `--value`, piped stdin, or a hidden prompt.
///
/// Values are taken verbatim apart from one trailing newline on stdin.
pub fn read_secret_value(flag: Option<String>, no_input: bool) -> anyhow::Result<String> {
    if let Some(value) = flag {
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        let value = strip_line_ending(&buffer);
        if value.is_empty() {
            return Err(CliError::invalid_input("No secret value provided on stdin").into());
        }
        return Ok(value.to_string());
    }

    if no_input {
        return Err(CliError::invalid_input(
            "No secret value provided. Use --value or pipe it on stdin.",
        )
        .into());
    }

    Password::new()
        .with_prompt("Secret value")
        .with_confirmation("Confirm value", "Values do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read value: {}", e))
}

/// Ask a yes/no question. Without a TTY the answer is "no".
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))
}

fn strip_line_ending(value: &str) -> &str {
    value
        .strip_suffix("\r\n")
        .or_else(|| value.strip_suffix('\n'))
        .unwrap_or(value)
}
