//! Ordered pattern cascades
//!
//! Every extraction step is driven by an ordered list of `(regex, capture
//! group)` rules. Rules are evaluated in order and the first rule that yields
//! a value wins; later rules are never consulted, even if they would capture
//! something different. Rule order is therefore priority and is preserved
//! exactly as loaded.
//!
//! The table is built once (see `config`) and never mutated afterwards.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which cascade a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    /// Amount of an outflow
    Debit,
    /// Amount of an inflow
    Credit,
    /// Source account suffix
    Account,
    /// Payee / merchant name
    Merchant,
    /// Self-transfer phrasing (match only, no capture)
    Transfer,
    /// Destination account suffix of a transfer
    DestinationAccount,
    /// Bank reference / transaction id used for dedup
    Reference,
}

impl PatternCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Account => "account",
            Self::Merchant => "merchant",
            Self::Transfer => "transfer",
            Self::DestinationAccount => "destination_account",
            Self::Reference => "reference",
        }
    }

    /// All categories, in pipeline order
    pub fn all() -> &'static [PatternCategory] {
        &[
            Self::Debit,
            Self::Credit,
            Self::Account,
            Self::Merchant,
            Self::Transfer,
            Self::DestinationAccount,
            Self::Reference,
        ]
    }

    /// Whether rules in this category extract a capture group
    pub fn captures(&self) -> bool {
        !matches!(self, Self::Transfer)
    }
}

impl std::str::FromStr for PatternCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            "account" => Ok(Self::Account),
            "merchant" => Ok(Self::Merchant),
            "transfer" => Ok(Self::Transfer),
            "destination_account" | "destination" => Ok(Self::DestinationAccount),
            "reference" => Ok(Self::Reference),
            _ => Err(format!("Unknown pattern category: {}", s)),
        }
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single compiled rule
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub category: PatternCategory,
    pub pattern: Regex,
    /// Capture group holding the extracted value (0 for match-only rules)
    pub group: usize,
}

impl PatternRule {
    /// Compile a rule, checking that the capture group exists
    pub fn new(category: PatternCategory, pattern: &str, group: usize) -> Result<Self> {
        let pattern = Regex::new(pattern)?;
        if group >= pattern.captures_len() {
            return Err(Error::InvalidPattern(format!(
                "{} rule '{}' has no capture group {}",
                category,
                pattern.as_str(),
                group
            )));
        }
        Ok(Self {
            category,
            pattern,
            group,
        })
    }

    /// Value of this rule's capture group, if the rule matches and the group participated
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)?
            .get(self.group)
            .map(|m| m.as_str())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// The winning rule of a cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'t> {
    /// Position of the rule within its category
    pub rule: usize,
    pub value: &'t str,
}

/// Immutable rule set for every cascade plus the plain-substring guards
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    debit: Vec<PatternRule>,
    credit: Vec<PatternRule>,
    account: Vec<PatternRule>,
    merchant: Vec<PatternRule>,
    transfer: Vec<PatternRule>,
    destination_account: Vec<PatternRule>,
    reference: Vec<PatternRule>,
    /// Uppercased sender markers of non-transactional senders
    ignored_senders: Vec<String>,
    /// Lowercased body markers of failed transactions
    rejection_keywords: Vec<String>,
}

impl PatternTable {
    /// Build a table from rules in priority order.
    ///
    /// Rules keep their relative order within each category.
    pub fn new(
        rules: impl IntoIterator<Item = PatternRule>,
        ignored_senders: impl IntoIterator<Item = String>,
        rejection_keywords: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut table = Self {
            ignored_senders: ignored_senders
                .into_iter()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            rejection_keywords: rejection_keywords
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            ..Default::default()
        };

        for rule in rules {
            table.rules_mut(rule.category).push(rule);
        }

        table
    }

    /// Rules of one category, in priority order
    pub fn rules(&self, category: PatternCategory) -> &[PatternRule] {
        match category {
            PatternCategory::Debit => &self.debit,
            PatternCategory::Credit => &self.credit,
            PatternCategory::Account => &self.account,
            PatternCategory::Merchant => &self.merchant,
            PatternCategory::Transfer => &self.transfer,
            PatternCategory::DestinationAccount => &self.destination_account,
            PatternCategory::Reference => &self.reference,
        }
    }

    fn rules_mut(&mut self, category: PatternCategory) -> &mut Vec<PatternRule> {
        match category {
            PatternCategory::Debit => &mut self.debit,
            PatternCategory::Credit => &mut self.credit,
            PatternCategory::Account => &mut self.account,
            PatternCategory::Merchant => &mut self.merchant,
            PatternCategory::Transfer => &mut self.transfer,
            PatternCategory::DestinationAccount => &mut self.destination_account,
            PatternCategory::Reference => &mut self.reference,
        }
    }

    pub fn ignored_senders(&self) -> &[String] {
        &self.ignored_senders
    }

    pub fn rejection_keywords(&self) -> &[String] {
        &self.rejection_keywords
    }

    /// First rule in `category` that yields a capture
    pub fn first_capture<'t>(
        &self,
        category: PatternCategory,
        text: &'t str,
    ) -> Option<RuleMatch<'t>> {
        self.rules(category)
            .iter()
            .enumerate()
            .find_map(|(rule, r)| r.capture(text).map(|value| RuleMatch { rule, value }))
    }

    /// Whether any rule in `category` matches
    pub fn any_match(&self, category: PatternCategory, text: &str) -> bool {
        self.rules(category).iter().any(|r| r.is_match(text))
    }

    /// Total number of rules across all categories
    pub fn len(&self) -> usize {
        PatternCategory::all()
            .iter()
            .map(|c| self.rules(*c).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
