pub mod cli;
pub mod commands;
pub mod logging;

#[cfg(test)]
pub mod test_util;

use std::io::Write;

use clap::Parser;

use kindred_lib::output::Console;

use cli::{Cli, Command, ConfigCommand};

/// Main CLI entry point. Parses args and dispatches to the appropriate command.
pub async fn try_run<OUT, ERR>(
    args: &[&str],
    console: &mut dyn Console<OUT, ERR>,
) -> anyhow::Result<()>
where
    OUT: Write,
    ERR: Write,
{
    let cli = Cli::try_parse_from(args)?;

    match cli.command {
        Command::Find {
            note,
            location,
            dry_run,
        } => commands::find::run_find(&note, &location.context()?, dry_run, console).await,
        Command::Config { config_command } => match config_command {
            ConfigCommand::Show { location } => {
                commands::config::run_show(&location.context()?, console)
            }
            ConfigCommand::Set {
                key,
                value,
                location,
            } => commands::config::run_set(&key, &value, &location.context()?, console),
        },
    }
}
