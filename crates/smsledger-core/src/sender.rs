//! Sender filter
//!
//! Runs before any regex work so the common "not a bank message" case stays
//! cheap. Matching is plain case-insensitive substring containment.

use crate::models::{BlockReason, BlockSettings};
use crate::patterns::PatternTable;

/// Check a sender (and body, for user keywords) against the built-in markers
/// and the user's blocklist. Returns the first reason found.
pub fn check_sender(
    sender: &str,
    body: &str,
    table: &PatternTable,
    settings: &BlockSettings,
) -> Option<BlockReason> {
    let sender_upper = sender.to_uppercase();

    if let Some(marker) = table
        .ignored_senders()
        .iter()
        .find(|m| sender_upper.contains(m.as_str()))
    {
        return Some(BlockReason::IgnoredSender(marker.clone()));
    }

    if let Some(entry) = first_contained(
        &sender_upper,
        &settings.blocked_senders,
        str::to_uppercase,
    ) {
        return Some(BlockReason::BlockedSender(entry));
    }

    let body_lower = body.to_lowercase();
    first_contained(&body_lower, &settings.blocked_keywords, str::to_lowercase)
        .map(BlockReason::BlockedKeyword)
}

/// First non-empty entry whose normalized form occurs in `haystack`.
///
/// Entries are sorted first so the reported reason is stable across runs.
fn first_contained<'a>(
    haystack: &str,
    entries: impl IntoIterator<Item = &'a String>,
    normalize: fn(&str) -> String,
) -> Option<String> {
    let mut entries: Vec<&String> = entries.into_iter().collect();
    entries.sort();
    entries
        .into_iter()
        .find(|entry| {
            let needle = normalize(entry.trim());
            !needle.is_empty() && haystack.contains(&needle)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::builtin().unwrap()
    }

    #[test]
    fn test_ignored_marker_is_case_insensitive() {
        let settings = BlockSettings::default();
        let reason = check_sender("ad-otp", "Your OTP is 123456", &table(), &settings);
        assert_eq!(reason, Some(BlockReason::IgnoredSender("OTP".to_string())));
    }

    #[test]
    fn test_carrier_sender_blocked() {
        let settings = BlockSettings::default();
        assert!(check_sender("VM-AIRTEL", "Recharge done", &table(), &settings).is_some());
    }

    #[test]
    fn test_alert_and_advert_senders_blocked() {
        let settings = BlockSettings::default();
        assert_eq!(
            check_sender("VM-ALERTS", "Rs 500 debited", &table(), &settings),
            Some(BlockReason::IgnoredSender("ALERT".to_string()))
        );
        assert_eq!(
            check_sender("JD-ADVERT", "Rs 500 debited", &table(), &settings),
            Some(BlockReason::IgnoredSender("ADVERT".to_string()))
        );
        assert!(check_sender("ALERTS", "Rs 500 debited", &table(), &settings).is_some());
    }

    #[test]
    fn test_bank_sender_passes() {
        let settings = BlockSettings::default();
        assert_eq!(check_sender("AD-HDFCBK", "Rs 10 debited", &table(), &settings), None);
        assert_eq!(check_sender("AMZPAY", "Paid Rs 10", &table(), &settings), None);
    }

    #[test]
    fn test_user_blocked_sender_substring() {
        let mut settings = BlockSettings::default();
        settings.blocked_senders.insert("swiggy".to_string());

        let reason = check_sender("VK-SWIGGYIN", "Rs 10 debited", &table(), &settings);
        assert_eq!(reason, Some(BlockReason::BlockedSender("swiggy".to_string())));
    }

    #[test]
    fn test_user_blocked_keyword_in_body() {
        let mut settings = BlockSettings::default();
        settings.blocked_keywords.insert("Lottery".to_string());

        let body = "You won a LOTTERY of Rs 5000 credited";
        let reason = check_sender("HDFCBK", body, &table(), &settings);
        assert_eq!(reason, Some(BlockReason::BlockedKeyword("Lottery".to_string())));
    }

    #[test]
    fn test_empty_entries_never_match() {
        let mut settings = BlockSettings::default();
        settings.blocked_senders.insert("   ".to_string());
        settings.blocked_keywords.insert(String::new());

        assert_eq!(check_sender("HDFCBK", "Rs 10 debited", &table(), &settings), None);
    }
}
