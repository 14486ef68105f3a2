//! Pattern table listing

use std::path::Path;

use anyhow::Result;
use smsledger_core::{PatternCategory, PatternTable};

use super::load_parser;

pub fn cmd_patterns(patterns: Option<&Path>, category: Option<&str>) -> Result<()> {
    let parser = load_parser(patterns)?;
    print!("{}", render_table(parser.table(), category)?);
    Ok(())
}

/// Render rules per category in priority order
pub fn render_table(table: &PatternTable, category: Option<&str>) -> Result<String> {
    let categories: Vec<PatternCategory> = match category {
        Some(s) => vec![s.parse().map_err(|e: String| anyhow::anyhow!(e))?],
        None => PatternCategory::all().to_vec(),
    };

    let mut out = String::new();
    for cat in categories {
        let rules = table.rules(cat);
        out.push_str(&format!("{} ({} rules)\n", cat, rules.len()));
        for (i, rule) in rules.iter().enumerate() {
            if cat.captures() {
                out.push_str(&format!("  {:>2}. [group {}] {}\n", i + 1, rule.group, rule.pattern));
            } else {
                out.push_str(&format!("  {:>2}. {}\n", i + 1, rule.pattern));
            }
        }
        out.push('\n');
    }

    if category.is_none() {
        out.push_str(&format!("ignored senders: {}\n", table.ignored_senders().join(", ")));
        out.push_str(&format!(
            "rejection keywords: {}\n",
            table.rejection_keywords().join(", ")
        ));
    }

    Ok(out)
}
