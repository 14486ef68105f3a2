//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SMS Ledger - Turn bank notifications into transactions
#[derive(Parser)]
#[command(name = "smsledger")]
#[command(about = "Offline bank notification parser", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Pattern table override (TOML)
    ///
    /// Categories in this file replace the built-in rules for that category.
    /// Defaults to ~/.local/share/smsledger/config/patterns.toml if present.
    #[arg(long, global = true)]
    pub patterns: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a single notification
    Parse {
        /// Sender address (e.g. AD-HDFCBK)
        #[arg(short, long)]
        sender: String,

        /// Message body
        #[arg(short, long)]
        body: String,

        /// Receive time (RFC 3339, epoch millis, ...); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Blocklist file (TOML with blocked_senders / blocked_keywords)
        #[arg(long)]
        blocklist: Option<PathBuf>,

        /// Last digits of one of your own accounts (repeatable)
        #[arg(short, long = "account")]
        accounts: Vec<String>,
    },

    /// Import a notification backlog
    Import {
        /// Backlog file (JSON lines or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Input format: jsonl, csv (auto-detected from extension if not specified)
        #[arg(long)]
        format: Option<String>,

        /// Write parsed transactions here as JSON lines (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Blocklist file (TOML with blocked_senders / blocked_keywords)
        #[arg(long)]
        blocklist: Option<PathBuf>,

        /// Last digits of one of your own accounts (repeatable)
        #[arg(short, long = "account")]
        accounts: Vec<String>,
    },

    /// List the pattern table in priority order
    Patterns {
        /// Only show one category (debit, credit, account, merchant, transfer,
        /// destination_account, reference)
        #[arg(short, long)]
        category: Option<String>,
    },
}
