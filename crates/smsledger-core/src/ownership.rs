//! Account ownership matching for self-transfers
//!
//! Only supplies the two booleans; deciding what an internal transfer means
//! for totals is up to the caller (see `OwnershipMatch::is_internal`).

use crate::models::{OwnershipMatch, RegisteredAccount};

/// Match both sides of a transfer against the user's registered accounts
pub fn match_ownership(
    source: &str,
    destination: Option<&str>,
    accounts: &[RegisteredAccount],
) -> OwnershipMatch {
    OwnershipMatch {
        source_is_own: is_own(source, accounts),
        dest_is_own: destination.is_some_and(|d| is_own(d, accounts)),
    }
}

/// Whether an extracted suffix belongs to any registered account.
///
/// Masking characters are stripped from both sides, then either digit string
/// may end with the other, so a 3-digit capture still matches a registered
/// last-4 and vice versa.
pub fn is_own(suffix: &str, accounts: &[RegisteredAccount]) -> bool {
    let extracted = digits(suffix);
    if extracted.is_empty() {
        return false;
    }

    accounts.iter().any(|account| {
        let registered = digits(&account.last4);
        !registered.is_empty()
            && (extracted.ends_with(&registered) || registered.ends_with(&extracted))
    })
}

fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
