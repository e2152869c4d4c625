// src/cli/dispatcher.rs

use crate::cli::{Cli, Command, handlers};
use anyhow::Result;

/// Routes a parsed command line to its handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    match cli.command {
        Command::Run { input } => handlers::run::handle(&input, &cli.output, cli.delimiter, !cli.quiet),
    }
}
