//! Account suffix extraction
//!
//! Suffixes are returned as captured (e.g. "XX1234"); masking characters are
//! only stripped when comparing against registered accounts.

use crate::models::UNKNOWN_ACCOUNT;
use crate::patterns::{PatternCategory, PatternTable};

/// Source account suffix, or "Unknown"
pub fn extract_account(body: &str, table: &PatternTable) -> String {
    extract_suffix(body, table, PatternCategory::Account)
        .unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string())
}

/// Destination account suffix of a transfer, if one is named
pub fn extract_destination(body: &str, table: &PatternTable) -> Option<String> {
    extract_suffix(body, table, PatternCategory::DestinationAccount)
}

fn extract_suffix(body: &str, table: &PatternTable, category: PatternCategory) -> Option<String> {
    table
        .first_capture(category, body)
        .map(|m| m.value.trim().to_string())
        .filter(|s| !s.is_empty())
}
