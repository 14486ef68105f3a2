//! Backlog import command

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use smsledger_core::{
    collect_batch,
    import::{read_notifications, ImportFormat},
    BatchSummary, DedupIndex, ParseContext,
};

use super::{load_block_settings, load_parser, registered_accounts};

pub fn cmd_import(
    patterns: Option<&Path>,
    file: &Path,
    format_str: Option<&str>,
    out: Option<&Path>,
    blocklist: Option<&Path>,
    accounts: &[String],
) -> Result<BatchSummary> {
    let format: ImportFormat = match format_str {
        Some(s) => s.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => ImportFormat::from_path(file).ok_or_else(|| {
            anyhow::anyhow!(
                "Could not detect format from file name: {}\n\
                 Specify --format with one of: jsonl, csv",
                file.display()
            )
        })?,
    };

    let parser = load_parser(patterns)?;
    let settings = load_block_settings(blocklist)?;
    let accounts = registered_accounts(accounts);

    let input =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let notifications = read_notifications(BufReader::new(input), format)
        .with_context(|| format!("Failed to read {} backlog: {}", format, file.display()))?;

    eprintln!(
        "📥 Parsing {} notifications from {}...",
        notifications.len(),
        file.display()
    );

    let ctx = ParseContext::new(&settings, &accounts);
    let outcomes = parser.evaluate_batch(&notifications, &ctx);
    let mut index = DedupIndex::new();
    let (results, summary) = collect_batch(outcomes, &mut index);

    match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            for result in &results {
                serde_json::to_writer(&mut writer, result)?;
                writeln!(writer)?;
            }
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            for result in &results {
                serde_json::to_writer(&mut writer, result)?;
                writeln!(writer)?;
            }
        }
    }

    eprintln!();
    eprintln!("✅ Import complete!");
    eprintln!("   Notifications: {}", summary.total);
    eprintln!("   Transactions:  {}", summary.emitted);
    eprintln!("   Duplicates:    {}", summary.duplicates);
    if summary.rejected_total() > 0 {
        eprintln!("   Rejected:      {}", summary.rejected_total());
        for (kind, count) in &summary.rejected {
            eprintln!("     {:<16} {}", kind, count);
        }
    }

    let internal = results.iter().filter(|r| !r.counts_toward_totals()).count();
    if internal > 0 {
        eprintln!("   Internal transfers (not counted): {}", internal);
    }

    Ok(summary)
}
