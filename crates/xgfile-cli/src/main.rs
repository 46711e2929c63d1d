//! xgfile binary entry point.
//!
//! A thin wrapper around the xgfile library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging on stderr
//! 3. Extracts the segments of one game data file
//! 4. Prints one line per segment on stdout

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Args;
use std::io;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("Arguments: {:?}", args);

    let stdout = io::stdout();
    cli::run(&args, &mut stdout.lock())?;
    Ok(())
}
