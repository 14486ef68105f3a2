//! Self-transfer detection

use crate::account::extract_destination;
use crate::patterns::{PatternCategory, PatternTable};

/// Transfer fields of a parse result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferInfo {
    pub is_self_transfer: bool,
    /// Only looked up when `is_self_transfer` is set
    pub destination_account_suffix: Option<String>,
}

/// Flag transfer phrasing (payment rails, "fund transfer", "own account", ...)
/// and, if flagged, extract the destination account suffix.
pub fn detect_transfer(body: &str, table: &PatternTable) -> TransferInfo {
    if !table.any_match(PatternCategory::Transfer, body) {
        return TransferInfo::default();
    }

    TransferInfo {
        is_self_transfer: true,
        destination_account_suffix: extract_destination(body, table),
    }
}
