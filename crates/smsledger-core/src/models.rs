//! Domain models for SMS Ledger

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account suffix used when no account pattern matches
pub const UNKNOWN_ACCOUNT: &str = "Unknown";

/// Merchant used when no merchant pattern matches
pub const UNKNOWN_MERCHANT: &str = "Unknown Merchant";

/// A notification exactly as delivered by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNotification {
    /// Sender address or alphanumeric header (e.g. "AD-HDFCBK")
    #[serde(alias = "address", alias = "sender_address")]
    pub sender: String,
    pub body: String,
    #[serde(alias = "date", alias = "timestamp")]
    pub received_at: DateTime<Utc>,
}

impl RawNotification {
    pub fn new(
        sender: impl Into<String>,
        body: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            received_at,
        }
    }
}

/// Direction of money flow relative to the user's account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Outflow
    Debit,
    /// Inflow
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" | "dr" => Ok(Self::Debit),
            "credit" | "cr" => Ok(Self::Credit),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-maintained blocklist, supplied by the settings store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSettings {
    /// Substrings of sender addresses to ignore (case-insensitive)
    #[serde(default)]
    pub blocked_senders: HashSet<String>,
    /// Substrings of message bodies to ignore (case-insensitive)
    #[serde(default)]
    pub blocked_keywords: HashSet<String>,
}

impl BlockSettings {
    pub fn is_empty(&self) -> bool {
        self.blocked_senders.is_empty() && self.blocked_keywords.is_empty()
    }
}

/// One of the user's own accounts, identified by its last digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisteredAccount {
    pub last4: String,
}

impl RegisteredAccount {
    pub fn new(last4: impl Into<String>) -> Self {
        Self {
            last4: last4.into(),
        }
    }
}

/// Whether each side of a self-transfer belongs to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipMatch {
    pub source_is_own: bool,
    pub dest_is_own: bool,
}

impl OwnershipMatch {
    /// Money moved between two of the user's own accounts.
    ///
    /// Internal transfers are excluded from income/expense totals; anything
    /// else (one side or neither side owned) is recorded normally.
    pub fn is_internal(&self) -> bool {
        self.source_is_own && self.dest_is_own
    }
}

/// A classified transaction candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Always strictly positive and finite
    pub amount: f64,
    pub direction: Direction,
    pub account_suffix: String,
    /// At most 53 characters (50 plus an ellipsis)
    pub merchant: String,
    pub is_self_transfer: bool,
    /// Only computed for self-transfers
    pub destination_account_suffix: Option<String>,
    /// Only computed for self-transfers
    pub ownership: Option<OwnershipMatch>,
    pub original_text: String,
    pub timestamp: DateTime<Utc>,
    /// Hex-encoded SHA-256 content fingerprint
    pub dedup_hash: String,
}

impl ParseResult {
    /// Whether this transaction belongs in income/expense totals
    pub fn counts_toward_totals(&self) -> bool {
        !self.ownership.is_some_and(|o| o.is_internal())
    }
}

/// Why the sender filter stopped a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// Built-in carrier/OTP/promo marker found in the sender
    IgnoredSender(String),
    /// User-configured sender entry found in the sender
    BlockedSender(String),
    /// User-configured keyword found in the body
    BlockedKeyword(String),
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IgnoredSender(marker) => write!(f, "ignored sender marker '{}'", marker),
            Self::BlockedSender(entry) => write!(f, "blocked sender '{}'", entry),
            Self::BlockedKeyword(entry) => write!(f, "blocked keyword '{}'", entry),
        }
    }
}

/// Why a notification produced no transaction.
///
/// Rejection is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Sender or body was empty
    EmptyInput,
    SenderBlocked(BlockReason),
    /// No debit or credit pattern matched
    Unclassified,
    /// Amount was zero, negative, or not a finite number
    InvalidAmount,
    /// Body carries a declined/failed marker
    Declined,
}

impl Rejection {
    /// Stable identifier for summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::SenderBlocked(_) => "sender_blocked",
            Self::Unclassified => "unclassified",
            Self::InvalidAmount => "invalid_amount",
            Self::Declined => "declined",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty sender or body"),
            Self::SenderBlocked(reason) => write!(f, "sender blocked: {}", reason),
            Self::Unclassified => write!(f, "no amount pattern matched"),
            Self::InvalidAmount => write!(f, "amount is not a positive number"),
            Self::Declined => write!(f, "declined or failed transaction"),
        }
    }
}
