//! Single notification command

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use smsledger_core::{import::parse_timestamp, Outcome, ParseContext, RawNotification};

use super::{load_block_settings, load_parser, registered_accounts};

pub fn cmd_parse(
    patterns: Option<&Path>,
    sender: &str,
    body: &str,
    at: Option<&str>,
    blocklist: Option<&Path>,
    accounts: &[String],
) -> Result<()> {
    let outcome = evaluate_one(patterns, sender, body, at, blocklist, accounts)?;

    match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.counts_toward_totals() {
                eprintln!(
                    "ℹ️  Internal transfer between your own accounts (not counted in totals)"
                );
            }
        }
        Err(rejection) => println!("rejected: {}", rejection),
    }

    Ok(())
}

/// Evaluate one notification with the given CLI inputs
pub fn evaluate_one(
    patterns: Option<&Path>,
    sender: &str,
    body: &str,
    at: Option<&str>,
    blocklist: Option<&Path>,
    accounts: &[String],
) -> Result<Outcome> {
    let parser = load_parser(patterns)?;
    let settings = load_block_settings(blocklist)?;
    let accounts = registered_accounts(accounts);

    let received_at = match at {
        Some(s) => parse_timestamp(s).with_context(|| format!("Invalid --at value: {}", s))?,
        None => Utc::now(),
    };

    let notification = RawNotification::new(sender, body, received_at);
    let ctx = ParseContext::new(&settings, &accounts);
    Ok(parser.evaluate(&notification, &ctx))
}
