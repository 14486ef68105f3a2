//! SMS Ledger Core Library
//!
//! On-device extraction of financial transactions from bank notification
//! text (SMS-style alerts). No network, no storage:
//! - Ordered, data-driven pattern cascades (embedded TOML, user override)
//! - Sender filtering against carrier/OTP/promo markers and user blocklists
//! - Debit/credit classification with first-match-wins precedence
//! - Account, merchant and self-transfer enrichment
//! - Ownership matching of transfer endpoints against registered accounts
//! - Content-addressed dedup hashing for re-delivered notifications
//! - Parallel backlog evaluation and JSON-lines/CSV backlog readers

pub mod account;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod import;
pub mod merchant;
pub mod models;
pub mod ownership;
pub mod parser;
pub mod patterns;
pub mod sender;
pub mod transfer;

pub use dedup::DedupIndex;
pub use error::{Error, Result};
pub use import::ImportFormat;
pub use models::{
    BlockReason, BlockSettings, Direction, OwnershipMatch, ParseResult, RawNotification,
    RegisteredAccount, Rejection,
};
pub use parser::{collect_batch, BatchSummary, NotificationParser, Outcome, ParseContext};
pub use patterns::{PatternCategory, PatternRule, PatternTable};
