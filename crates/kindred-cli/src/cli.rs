use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "kindred",
    about = "Find topically similar notes in a vault and link them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the vault for notes similar to NOTE and insert a link block.
    Find {
        /// The note to link from (vault-relative, or absolute inside the vault).
        note: PathBuf,
        #[command(flatten)]
        location: VaultArgs,
        /// Print the updated note to stdout instead of writing it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect or change settings.
    Config {
        #[command(subcommand)]
        config_command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective settings as JSON.
    Show {
        #[command(flatten)]
        location: VaultArgs,
    },
    /// Set one setting, validate it, and save.
    Set {
        /// Setting name, e.g. `max_links`.
        key: String,
        /// New value. Lists take comma-separated entries.
        value: String,
        #[command(flatten)]
        location: VaultArgs,
    },
}

/// Where the vault and its settings file live.
#[derive(Args, Debug, Clone, Default)]
pub struct VaultArgs {
    /// Vault root directory. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub vault: Option<PathBuf>,
    /// Settings file to use instead of `<vault>/.kindred/settings.json`.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_parses_flags() {
        let cli = Cli::try_parse_from([
            "kindred", "find", "notes/a.md", "--vault", "/v", "--dry-run",
        ])
        .unwrap();
        let Command::Find {
            note,
            location,
            dry_run,
        } = cli.command
        else {
            panic!("expected find");
        };
        assert_eq!(note, PathBuf::from("notes/a.md"));
        assert_eq!(location.vault, Some(PathBuf::from("/v")));
        assert_eq!(location.config, None);
        assert!(dry_run);
    }

    #[test]
    fn config_set_takes_key_and_value() {
        let cli = Cli::try_parse_from(["kindred", "config", "set", "max_links", "5"]).unwrap();
        let Command::Config {
            config_command: ConfigCommand::Set { key, value, .. },
        } = cli.command
        else {
            panic!("expected config set");
        };
        assert_eq!(key, "max_links");
        assert_eq!(value, "5");
    }

    #[test]
    fn find_requires_a_note() {
        assert!(Cli::try_parse_from(["kindred", "find"]).is_err());
    }
}
