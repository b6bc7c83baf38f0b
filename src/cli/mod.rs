//! ashar CLI - pack, list, and extract archives from the command line

pub mod commands;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "ashar")]
#[command(version, about = "Pack a directory tree into a single archive", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the ashar CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
