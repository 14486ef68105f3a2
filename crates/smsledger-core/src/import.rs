//! Notification backlog readers
//!
//! Bulk imports come from SMS backup exports in one of two shapes:
//! - JSON lines, one `RawNotification` object per line
//! - CSV with a `sender,body,received_at` header (column order is free)

use std::io::{BufRead, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::RawNotification;

/// Supported backlog formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    JsonLines,
    Csv,
}

impl ImportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonLines => "jsonl",
            Self::Csv => "csv",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jsonl" | "ndjson" | "json" => Some(Self::JsonLines),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

impl std::str::FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" | "ndjson" | "json" => Ok(Self::JsonLines),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unknown import format: {}", s)),
        }
    }
}

impl std::fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read a backlog in the given format
pub fn read_notifications<R: BufRead>(
    reader: R,
    format: ImportFormat,
) -> Result<Vec<RawNotification>> {
    match format {
        ImportFormat::JsonLines => read_jsonl(reader),
        ImportFormat::Csv => read_csv(reader),
    }
}

/// Read JSON lines. Blank lines are skipped.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<RawNotification>> {
    let mut notifications = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let notification: RawNotification = serde_json::from_str(&line)
            .map_err(|e| Error::Import(format!("Line {}: {}", i + 1, e)))?;
        notifications.push(notification);
    }

    debug!("Read {} notifications from JSON lines", notifications.len());
    Ok(notifications)
}

/// Read a CSV export with `sender`, `body` and `received_at` columns
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawNotification>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
    };

    let sender_col = column(&["sender", "address", "sender_address"])
        .ok_or_else(|| Error::Import("Missing sender column".into()))?;
    let body_col = column(&["body", "message", "text"])
        .ok_or_else(|| Error::Import("Missing body column".into()))?;
    let time_col = column(&["received_at", "date", "timestamp"])
        .ok_or_else(|| Error::Import("Missing received_at column".into()))?;

    let mut notifications = Vec::new();

    for result in rdr.records() {
        let record = result?;

        let sender = record
            .get(sender_col)
            .ok_or_else(|| Error::Import("Missing sender".into()))?;
        let body = record
            .get(body_col)
            .ok_or_else(|| Error::Import("Missing body".into()))?;
        let time_str = record
            .get(time_col)
            .ok_or_else(|| Error::Import("Missing received_at".into()))?;

        notifications.push(RawNotification::new(sender, body, parse_timestamp(time_str)?));
    }

    debug!("Read {} notifications from CSV", notifications.len());
    Ok(notifications)
}

/// Parse a timestamp in the shapes SMS backup tools produce
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Epoch milliseconds (Android SMS provider)
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        if let Some(dt) = s
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        {
            return Ok(dt);
        }
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S", // 2026-02-12 09:30:00
        "%Y-%m-%dT%H:%M:%S", // 2026-02-12T09:30:00
        "%d-%m-%Y %H:%M:%S", // 12-02-2026 09:30:00
        "%d/%m/%Y %H:%M",    // 12/02/2026 09:30
    ];

    for fmt in formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    Err(Error::Import(format!("Unable to parse timestamp: {}", s)))
}
