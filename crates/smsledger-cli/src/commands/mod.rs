//! CLI command implementations
//!
//! - `parse` - Parse a single notification
//! - `import` - Bulk import of a notification backlog
//! - `patterns` - Pattern table listing
//!
//! Shared helpers for loading the parser, blocklist and account list live here.

pub mod import;
pub mod parse;
pub mod patterns;

pub use import::*;
pub use parse::*;
pub use patterns::*;

use std::path::Path;

use anyhow::{Context, Result};
use smsledger_core::{BlockSettings, NotificationParser, RegisteredAccount};

/// Load the parser, honoring a `--patterns` override
pub fn load_parser(patterns: Option<&Path>) -> Result<NotificationParser> {
    NotificationParser::load(patterns).context("Failed to load pattern table")
}

/// Read a blocklist file. No file means nothing is blocked.
///
/// ```toml
/// blocked_senders = ["PROMOBK"]
/// blocked_keywords = ["lottery"]
/// ```
pub fn load_block_settings(path: Option<&Path>) -> Result<BlockSettings> {
    let Some(path) = path else {
        return Ok(BlockSettings::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read blocklist: {}", path.display()))?;
    let settings: BlockSettings = toml::from_str(&content)
        .with_context(|| format!("Invalid blocklist: {}", path.display()))?;

    tracing::debug!(
        "Blocklist: {} senders, {} keywords",
        settings.blocked_senders.len(),
        settings.blocked_keywords.len()
    );
    Ok(settings)
}

/// Turn `--account` values into registered accounts, skipping blanks
pub fn registered_accounts(values: &[String]) -> Vec<RegisteredAccount> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(RegisteredAccount::new)
        .collect()
}
