//! Merchant / payee extraction
//!
//! Several markers can match one message (e.g. both "at ZOMATO" and
//! "via HDFC BANK"). The winner is decided by rule order only, never by how
//! specific a match looks.

use crate::models::UNKNOWN_MERCHANT;
use crate::patterns::{PatternCategory, PatternTable};

/// Canonical merchant for UPI payee strings
pub const UPI_MERCHANT: &str = "UPI Transaction";

/// Merchant names longer than this are truncated and get "..." appended
pub const MAX_MERCHANT_CHARS: usize = 50;

/// Extract and normalize the merchant, or "Unknown Merchant"
pub fn extract_merchant(body: &str, table: &PatternTable) -> String {
    table
        .first_capture(PatternCategory::Merchant, body)
        .map(|m| m.value.trim())
        .filter(|s| !s.is_empty())
        .map(normalize_merchant)
        .unwrap_or_else(|| UNKNOWN_MERCHANT.to_string())
}

/// Collapse UPI payee strings and cap the length
pub fn normalize_merchant(raw: &str) -> String {
    let raw = raw.trim();
    let name = if raw.to_lowercase().contains("upi") {
        UPI_MERCHANT
    } else {
        raw
    };

    if name.chars().count() > MAX_MERCHANT_CHARS {
        let truncated: String = name.chars().take(MAX_MERCHANT_CHARS).collect();
        format!("{}...", truncated)
    } else {
        name.to_string()
    }
}
