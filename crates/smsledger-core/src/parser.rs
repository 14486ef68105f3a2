//! Notification parsing pipeline
//!
//! Steps run in a fixed order, each short-circuiting on rejection:
//!
//! 1. empty input check
//! 2. sender filter (built-in markers, user blocklist)
//! 3. amount/direction classification
//! 4. enrichment: account, merchant, transfer (+ ownership for transfers)
//! 5. guards: invalid amount, declined/failed markers
//! 6. dedup hash
//!
//! Parsing is a pure function of its inputs. `NotificationParser` only holds
//! the immutable pattern table, so one instance can be shared across threads.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::account::extract_account;
use crate::classify::classify;
use crate::dedup::{dedup_hash, DedupIndex};
use crate::error::Result;
use crate::merchant::extract_merchant;
use crate::models::{
    BlockSettings, ParseResult, RawNotification, RegisteredAccount, Rejection,
};
use crate::ownership::match_ownership;
use crate::patterns::PatternTable;
use crate::sender::check_sender;
use crate::transfer::detect_transfer;

/// Result of evaluating one notification
pub type Outcome = std::result::Result<ParseResult, Rejection>;

/// Per-call snapshots of the external collaborators
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub settings: &'a BlockSettings,
    pub accounts: &'a [RegisteredAccount],
}

impl<'a> ParseContext<'a> {
    pub fn new(settings: &'a BlockSettings, accounts: &'a [RegisteredAccount]) -> Self {
        Self { settings, accounts }
    }
}

/// The bank notification parser
#[derive(Debug, Clone)]
pub struct NotificationParser {
    table: PatternTable,
}

impl NotificationParser {
    pub fn new(table: PatternTable) -> Self {
        Self { table }
    }

    /// Parser over the embedded default patterns
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(PatternTable::builtin()?))
    }

    /// Parser over the resolved pattern config (override, then defaults)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        Ok(Self::new(PatternTable::load(override_path)?))
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Parse a notification, or `None` if it is not a usable transaction
    pub fn parse(
        &self,
        notification: &RawNotification,
        ctx: &ParseContext<'_>,
    ) -> Option<ParseResult> {
        self.evaluate(notification, ctx).ok()
    }

    /// Parse a notification, reporting why it was rejected
    pub fn evaluate(&self, notification: &RawNotification, ctx: &ParseContext<'_>) -> Outcome {
        let outcome = self.run(notification, ctx);
        match &outcome {
            Ok(result) => debug!(
                sender = %notification.sender,
                direction = %result.direction,
                hash = &result.dedup_hash[..12],
                "Parsed transaction"
            ),
            Err(rejection) => debug!(
                sender = %notification.sender,
                reason = %rejection,
                "Rejected notification"
            ),
        }
        outcome
    }

    fn run(&self, notification: &RawNotification, ctx: &ParseContext<'_>) -> Outcome {
        let sender = notification.sender.trim();
        let body = notification.body.trim();

        if sender.is_empty() || body.is_empty() {
            return Err(Rejection::EmptyInput);
        }

        if let Some(reason) = check_sender(sender, body, &self.table, ctx.settings) {
            return Err(Rejection::SenderBlocked(reason));
        }

        let classification = classify(body, &self.table).ok_or(Rejection::Unclassified)?;

        let account_suffix = extract_account(body, &self.table);
        let merchant = extract_merchant(body, &self.table);
        let transfer = detect_transfer(body, &self.table);
        let ownership = transfer.is_self_transfer.then(|| {
            match_ownership(
                &account_suffix,
                transfer.destination_account_suffix.as_deref(),
                ctx.accounts,
            )
        });

        let amount = classification.amount;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Rejection::InvalidAmount);
        }

        if self.is_declined(body) {
            return Err(Rejection::Declined);
        }

        Ok(ParseResult {
            amount,
            direction: classification.direction,
            account_suffix,
            merchant,
            is_self_transfer: transfer.is_self_transfer,
            destination_account_suffix: transfer.destination_account_suffix,
            ownership,
            original_text: notification.body.clone(),
            timestamp: notification.received_at,
            dedup_hash: dedup_hash(sender, amount, body, &self.table),
        })
    }

    fn is_declined(&self, body: &str) -> bool {
        let body_lower = body.to_lowercase();
        self.table
            .rejection_keywords()
            .iter()
            .any(|k| body_lower.contains(k.as_str()))
    }

    /// Evaluate a backlog in parallel. Output order matches input order.
    pub fn evaluate_batch(
        &self,
        notifications: &[RawNotification],
        ctx: &ParseContext<'_>,
    ) -> Vec<Outcome> {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        if workers <= 1 || notifications.len() < 2 {
            return notifications.iter().map(|n| self.evaluate(n, ctx)).collect();
        }

        let chunk_size = notifications.len().div_ceil(workers);
        std::thread::scope(|scope| {
            let handles: Vec<_> = notifications
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|n| self.evaluate(n, ctx))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }
}

/// Tally of a processed batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub emitted: usize,
    pub duplicates: usize,
    /// Rejection counts keyed by `Rejection::kind`
    pub rejected: BTreeMap<&'static str, usize>,
}

impl BatchSummary {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Drop rejections and duplicates from a batch, keeping first sightings in order
pub fn collect_batch(
    outcomes: Vec<Outcome>,
    index: &mut DedupIndex,
) -> (Vec<ParseResult>, BatchSummary) {
    let mut summary = BatchSummary {
        total: outcomes.len(),
        ..Default::default()
    };
    let mut results = Vec::new();

    for outcome in outcomes {
        match outcome {
            Ok(result) => {
                if index.insert(&result) {
                    summary.emitted += 1;
                    results.push(result);
                } else {
                    summary.duplicates += 1;
                }
            }
            Err(rejection) => {
                *summary.rejected.entry(rejection.kind()).or_insert(0) += 1;
            }
        }
    }

    info!(
        "Processed {} notifications: {} emitted, {} duplicates, {} rejected",
        summary.total,
        summary.emitted,
        summary.duplicates,
        summary.rejected_total()
    );
    (results, summary)
}
