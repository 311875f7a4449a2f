//! # Analytics CLI Binary
//!
//! Command-line interface for analysing the cleaned player table.

use anyhow::Result;
use clap::Parser;
use roster_analytics::cli::{Cli, CliHandler};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Create CLI handler
    let handler = CliHandler::new(&cli.data_path)?;

    // Handle command
    handler.handle_command(cli.command)?;

    Ok(())
}
