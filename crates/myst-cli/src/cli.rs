use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use myst_core::VERSION;

/// Myst - a local, encrypted secret manager with metadata search
#[derive(Parser)]
#[command(name = "myst")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "MYST_CONFIG", value_name = "PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Where to keep the secret store (default: data directory)
    #[arg(long, value_name = "PATH")]
    pub store_path: Option<String>,

    /// Where to keep the search index (default: data directory)
    #[arg(long, value_name = "PATH")]
    pub index_path: Option<String>,

    /// Replace an existing configuration
    #[arg(long)]
    pub force: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Unique label for the secret
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Secret value (read from stdin or a hidden prompt when omitted)
    #[arg(long)]
    pub value: Option<String>,

    /// Website the secret belongs to
    #[arg(short, long)]
    pub website: Option<String>,

    /// Free-form notes
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `find` command
#[derive(Args)]
pub struct FindArgs {
    /// Search text, matched against key, website and notes
    #[arg(value_name = "QUERY", required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Secret key or ID
    #[arg(value_name = "KEY|ID")]
    pub target: String,

    /// Decrypt and print the value
    #[arg(long)]
    pub reveal: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `update` command
#[derive(Args)]
pub struct UpdateArgs {
    /// Secret key or ID
    #[arg(value_name = "KEY|ID")]
    pub target: String,

    /// New secret value
    #[arg(long, conflicts_with = "prompt_value")]
    pub value: Option<String>,

    /// Read a new value from stdin or a hidden prompt
    #[arg(long)]
    pub prompt_value: bool,

    /// New website (empty string clears it)
    #[arg(short, long)]
    pub website: Option<String>,

    /// New notes (empty string clears them)
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `remove` command
#[derive(Args)]
pub struct RemoveArgs {
    /// Secret key or ID
    #[arg(value_name = "KEY|ID")]
    pub target: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `check` and `reconcile` commands
#[derive(Args)]
pub struct MaintenanceArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set the master passphrase and write the config file
    Init(InitArgs),

    /// Add a new secret
    Add(AddArgs),

    /// Search secrets by key, website and notes
    Find(FindArgs),

    /// List all secrets
    List(ListArgs),

    /// Show one secret
    Show(ShowArgs),

    /// Change a secret's value or metadata
    Update(UpdateArgs),

    /// Remove a secret permanently
    Remove(RemoveArgs),

    /// Check store integrity and store/index consistency
    Check(MaintenanceArgs),

    /// Repair the search index from the secret store
    Reconcile(MaintenanceArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_find_joins_words() {
        let cli = Cli::parse_from(["myst", "find", "personal", "token"]);
        match cli.command {
            Some(Commands::Find(args)) => assert_eq!(args.query, vec!["personal", "token"]),
            _ => panic!("expected find"),
        }
    }

    #[test]
    fn test_update_value_flags_conflict() {
        let result = Cli::try_parse_from([
            "myst",
            "update",
            "github",
            "--value",
            "x",
            "--prompt-value",
        ]);
        assert!(result.is_err());
    }
}
