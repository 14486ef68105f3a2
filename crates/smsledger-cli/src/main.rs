//! SMS Ledger CLI - Offline bank notification parser
//!
//! Usage:
//!   smsledger parse --sender S --body B     Parse one notification
//!   smsledger import --file backlog.jsonl   Import a notification backlog
//!   smsledger patterns                      Show the pattern table

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let patterns = cli.patterns.as_deref();

    match cli.command {
        Commands::Parse {
            sender,
            body,
            at,
            blocklist,
            accounts,
        } => commands::cmd_parse(
            patterns,
            &sender,
            &body,
            at.as_deref(),
            blocklist.as_deref(),
            &accounts,
        ),
        Commands::Import {
            file,
            format,
            out,
            blocklist,
            accounts,
        } => commands::cmd_import(
            patterns,
            &file,
            format.as_deref(),
            out.as_deref(),
            blocklist.as_deref(),
            &accounts,
        )
        .map(|_| ()),
        Commands::Patterns { category } => commands::cmd_patterns(patterns, category.as_deref()),
    }
}
