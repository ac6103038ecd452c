//! UI context for environment detection and configuration.

use std::io::IsTerminal;

/// Terminal and environment context for UI decisions.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether color output is enabled
    pub color: bool,
    /// Whether `--json` was requested
    pub json: bool,
    /// Whether `--quiet` was requested
    pub quiet: bool,
}

impl UiContext {
    /// Create context from environment and CLI flags.
    ///
    /// Color is disabled by `--no-color`, `NO_COLOR`, `TERM=dumb`, or a
    /// non-TTY stdout.
    pub fn from_env(json_flag: bool, no_color_flag: bool, quiet: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let term_is_dumb = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
        let no_color_env = std::env::var_os("NO_COLOR").is_some();

        Self {
            color: is_tty && !no_color_flag && !no_color_env && !term_is_dumb && !json_flag,
            json: json_flag,
            quiet,
        }
    }

    /// Plain context: no color, human-readable output.
    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            color: false,
            json: false,
            quiet: false,
        }
    }
}
