//! Command implementations

mod catalog;
mod map;
mod score;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Score(args) => score::execute(args, config_file, cli.storage, &output).await,
        Commands::Map(args) => map::execute(args, cli.storage, &output).await,
        Commands::Catalog(args) => catalog::execute(args, config_file, &output),
    }
}
