//! Pattern table configuration
//!
//! The table is loaded with a two-layer resolution:
//! 1. An override file (explicit path, else ~/.local/share/smsledger/config/patterns.toml)
//! 2. The embedded defaults (compiled into the binary)
//!
//! Categories present in the override replace the default rules for that
//! category; anything the override leaves out keeps its default.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::patterns::{PatternCategory, PatternRule, PatternTable};

/// Embedded default config (compiled into binary)
pub const DEFAULT_PATTERNS: &str = include_str!("../../../config/patterns.toml");

/// Default override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("smsledger").join("config").join("patterns.toml"))
}

impl PatternTable {
    /// The embedded default table
    pub fn builtin() -> Result<Self> {
        Self::from_toml(DEFAULT_PATTERNS)
    }

    /// Parse a complete table from TOML, without layering over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        compile(raw)
    }

    /// Load the table: override first, then embedded defaults.
    ///
    /// An explicit `override_path` that exists must parse; a broken file at
    /// the per-user default location is skipped with a warning.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let defaults: RawConfig = toml::from_str(DEFAULT_PATTERNS)?;

        if let Some(path) = override_path {
            if path.exists() {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::InvalidData(format!("Failed to read {}: {}", path.display(), e))
                })?;
                let overrides: RawConfig = toml::from_str(&content)?;
                debug!("Loaded pattern override from {}", path.display());
                return compile(defaults.layer(overrides));
            }
            warn!(
                "Pattern override {} not found, using defaults",
                path.display()
            );
            return compile(defaults);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                match read_raw(&path) {
                    Ok(overrides) => {
                        debug!("Loaded pattern override from {}", path.display());
                        return compile(defaults.layer(overrides));
                    }
                    Err(e) => warn!("Ignoring pattern override {}: {}", path.display(), e),
                }
            }
        }

        compile(defaults)
    }
}

fn read_raw(path: &Path) -> Result<RawConfig> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    fragments: BTreeMap<String, String>,
    senders: Option<RawSenders>,
    guards: Option<RawGuards>,
    debit: Option<Vec<RawRule>>,
    credit: Option<Vec<RawRule>>,
    account: Option<Vec<RawRule>>,
    merchant: Option<Vec<RawRule>>,
    transfer: Option<Vec<RawRule>>,
    destination_account: Option<Vec<RawRule>>,
    reference: Option<Vec<RawRule>>,
}

#[derive(Debug, Deserialize)]
struct RawSenders {
    #[serde(default)]
    ignored: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawGuards {
    #[serde(default)]
    rejection_keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    pattern: String,
    group: Option<usize>,
}

impl RawConfig {
    /// Apply `overrides` on top of `self`
    fn layer(mut self, overrides: RawConfig) -> RawConfig {
        self.fragments.extend(overrides.fragments);
        if overrides.senders.is_some() {
            self.senders = overrides.senders;
        }
        if overrides.guards.is_some() {
            self.guards = overrides.guards;
        }
        if overrides.debit.is_some() {
            self.debit = overrides.debit;
        }
        if overrides.credit.is_some() {
            self.credit = overrides.credit;
        }
        if overrides.account.is_some() {
            self.account = overrides.account;
        }
        if overrides.merchant.is_some() {
            self.merchant = overrides.merchant;
        }
        if overrides.transfer.is_some() {
            self.transfer = overrides.transfer;
        }
        if overrides.destination_account.is_some() {
            self.destination_account = overrides.destination_account;
        }
        if overrides.reference.is_some() {
            self.reference = overrides.reference;
        }
        self
    }

    fn take_rules(&mut self, category: PatternCategory) -> Vec<RawRule> {
        let slot = match category {
            PatternCategory::Debit => &mut self.debit,
            PatternCategory::Credit => &mut self.credit,
            PatternCategory::Account => &mut self.account,
            PatternCategory::Merchant => &mut self.merchant,
            PatternCategory::Transfer => &mut self.transfer,
            PatternCategory::DestinationAccount => &mut self.destination_account,
            PatternCategory::Reference => &mut self.reference,
        };
        slot.take().unwrap_or_default()
    }
}

/// Replace `{name}` placeholders with their fragments.
///
/// Fragments may refer to other fragments; passes repeat until nothing
/// changes, bounded by the fragment count so a cycle cannot loop forever.
fn expand(pattern: &str, fragments: &BTreeMap<String, String>) -> String {
    let mut expanded = pattern.to_string();
    for _ in 0..=fragments.len() {
        let next = fragments.iter().fold(expanded.clone(), |acc, (name, fragment)| {
            acc.replace(&format!("{{{}}}", name), fragment)
        });
        if next == expanded {
            break;
        }
        expanded = next;
    }
    expanded
}

fn compile(mut raw: RawConfig) -> Result<PatternTable> {
    let mut rules = Vec::new();

    for &category in PatternCategory::all() {
        let default_group = if category.captures() { 1 } else { 0 };
        for (index, raw_rule) in raw.take_rules(category).into_iter().enumerate() {
            let pattern = expand(&raw_rule.pattern, &raw.fragments);
            let group = raw_rule.group.unwrap_or(default_group);
            let rule = PatternRule::new(category, &pattern, group).map_err(|e| {
                Error::InvalidPattern(format!("{} rule #{}: {}", category, index + 1, e))
            })?;
            rules.push(rule);
        }
    }

    let ignored = raw.senders.map(|s| s.ignored).unwrap_or_default();
    let keywords = raw
        .guards
        .map(|g| g.rejection_keywords)
        .unwrap_or_default();

    let table = PatternTable::new(rules, ignored, keywords);
    debug!("Compiled pattern table with {} rules", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let table = PatternTable::builtin().unwrap();
        for &category in PatternCategory::all() {
            assert!(
                !table.rules(category).is_empty(),
                "no default rules for {}",
                category
            );
        }
        assert!(table.ignored_senders().contains(&"OTP".to_string()));
        assert_eq!(
            table.rejection_keywords(),
            ["declined".to_string(), "failed".to_string()]
        );
    }

    #[test]
    fn test_fragments_are_expanded() {
        let table = PatternTable::builtin().unwrap();
        for &category in PatternCategory::all() {
            for rule in table.rules(category) {
                let src = rule.pattern.as_str();
                assert!(!src.contains("{amount}"), "unexpanded: {}", src);
                assert!(!src.contains("{acct}"), "unexpanded: {}", src);
                assert!(!src.contains("{name}"), "unexpanded: {}", src);
                assert!(!src.contains("{ref_id}"), "unexpanded: {}", src);
            }
        }
    }

    #[test]
    fn test_quantifier_braces_survive_expansion() {
        let mut fragments = BTreeMap::new();
        fragments.insert("amount".to_string(), "AMT".to_string());
        assert_eq!(expand(r"\d{3,4} {amount}", &fragments), r"\d{3,4} AMT");
    }

    #[test]
    fn test_nested_fragments_expand_regardless_of_order() {
        let mut fragments = BTreeMap::new();
        fragments.insert("a_outer".to_string(), "<{z_inner}>".to_string());
        fragments.insert("m_middle".to_string(), "[{a_outer}]".to_string());
        fragments.insert("z_inner".to_string(), "X".to_string());
        assert_eq!(expand("{m_middle}", &fragments), "[<X>]");
    }

    #[test]
    fn test_fragment_cycle_terminates() {
        let mut fragments = BTreeMap::new();
        fragments.insert("a".to_string(), "{b}".to_string());
        fragments.insert("b".to_string(), "{a}".to_string());
        let expanded = expand("{a}", &fragments);
        assert!(expanded == "{a}" || expanded == "{b}");
    }

    #[test]
    fn test_override_fragment_can_reference_default_fragment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [fragments]
            charge = '''(?:charged|billed)\s+{{amount}}'''

            [[debit]]
            pattern = '''(?i){{charge}}'''
            "#
        )
        .unwrap();

        let table = PatternTable::load(Some(file.path())).unwrap();
        let m = table
            .first_capture(PatternCategory::Debit, "Card billed INR 75")
            .unwrap();
        assert_eq!(m.value, "75");
    }

    #[test]
    fn test_transfer_rules_default_to_group_zero() {
        let table = PatternTable::from_toml(
            r#"
            [[transfer]]
            pattern = '''(?i)\bneft\b'''
            "#,
        )
        .unwrap();
        assert_eq!(table.rules(PatternCategory::Transfer)[0].group, 0);
    }

    #[test]
    fn test_bad_group_reports_rule_position() {
        let err = PatternTable::from_toml(
            r#"
            [[debit]]
            pattern = '''debited (\d+)'''

            [[debit]]
            pattern = '''spent \d+'''
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("debit rule #2"));
    }

    #[test]
    fn test_override_replaces_only_present_categories() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [senders]
            ignored = ["SPAMCO"]

            [[merchant]]
            pattern = '''(?i)shop:\s*(\w+)'''
            "#
        )
        .unwrap();

        let table = PatternTable::load(Some(file.path())).unwrap();
        let builtin = PatternTable::builtin().unwrap();

        assert_eq!(table.rules(PatternCategory::Merchant).len(), 1);
        assert_eq!(
            table.rules(PatternCategory::Debit).len(),
            builtin.rules(PatternCategory::Debit).len()
        );
        assert_eq!(table.ignored_senders(), ["SPAMCO".to_string()]);
        assert_eq!(table.rejection_keywords(), builtin.rejection_keywords());
    }

    #[test]
    fn test_override_can_use_default_fragments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[debit]]
            pattern = '''(?i)charged\s+{{amount}}'''
            "#
        )
        .unwrap();

        let table = PatternTable::load(Some(file.path())).unwrap();
        let m = table
            .first_capture(PatternCategory::Debit, "Card charged Rs 120.50")
            .unwrap();
        assert_eq!(m.value, "120.50");
    }

    #[test]
    fn test_missing_override_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let table = PatternTable::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(table.len(), PatternTable::builtin().unwrap().len());
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[debit]]\npattern = 42").unwrap();
        assert!(PatternTable::load(Some(file.path())).is_err());
    }
}
