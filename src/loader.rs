//! CSV input loading and file analysis.
//!
//! The loader reads a chat log CSV export into a collection of
//! [`MessageRecord`]s and computes a [`LoadSummary`] in the same pass:
//! sizes, totals, the date span, and a per-author roster in order of first
//! appearance.
//!
//! Required columns are `AuthorID`, `Author`, `Date` and `Content`;
//! `Attachments` and `Reactions` are picked up when present. A missing
//! required column or an unparseable timestamp fails the load as a whole —
//! no partial record set is retained.
//!
//! [`load_bad_words`] reads the newline-delimited word list used by the rule
//! engine. A missing word file disables bad-word filtering; it is not an
//! error.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{ChatsiftError, Result};
use crate::record::MessageRecord;
use crate::settings::DateBounds;

/// Timestamp formats accepted in the `Date` column, tried in order after
/// RFC 3339.
const DATE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d-%b-%y %I:%M %p",
    "%Y-%m-%d",
];

/// One author's entry in the load roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorStat {
    /// Opaque stable author identifier.
    pub id: String,

    /// Display name as seen on the author's first row.
    pub name: String,

    /// Number of messages by this author in the load.
    pub count: usize,
}

/// Aggregate facts about one loaded file.
#[derive(Debug, Clone)]
pub struct LoadSummary {
    /// Input file size in bytes.
    pub byte_size: u64,

    /// Total message rows.
    pub total_messages: usize,

    /// Distinct authors.
    pub total_authors: usize,

    /// Whitespace-delimited words across all content cells.
    pub total_words: usize,

    /// Distinct lower-cased words across all content cells.
    pub unique_words: usize,

    /// First and last timestamps, `None` for an empty file.
    pub date_bounds: Option<DateBounds>,

    /// Per-author roster in order of first appearance.
    pub authors: Vec<AuthorStat>,
}

impl LoadSummary {
    /// Date span of the load in whole days.
    pub fn date_range_days(&self) -> i64 {
        self.date_bounds
            .map(|b| (b.last - b.first).num_days())
            .unwrap_or(0)
    }
}

/// A loaded file: the immutable record snapshot plus its summary.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    /// Records in input file order.
    pub records: Vec<MessageRecord>,

    /// Aggregate facts computed during the load.
    pub summary: LoadSummary,
}

/// Loads and analyzes a chat log CSV export.
///
/// # Errors
///
/// - [`ChatsiftError::MissingColumn`] when a required header is absent
/// - [`ChatsiftError::InvalidTimestamp`] when a `Date` cell cannot be parsed
/// - I/O and CSV errors from the underlying reader
pub fn load_csv(path: &Path) -> Result<LoadedFile> {
    info!(path = %path.display(), "loading chat log export");
    let byte_size = fs::metadata(path)?.len();

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(ChatsiftError::MissingColumn {
                column: name,
                path: Some(path.to_path_buf()),
            })
    };

    let id_col = column("AuthorID")?;
    let author_col = column("Author")?;
    let date_col = column("Date")?;
    let content_col = column("Content")?;
    let attachment_col = headers.iter().position(|h| h == "Attachments");
    let reactions_col = headers.iter().position(|h| h == "Reactions");

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let cell = |idx: usize| row.get(idx).unwrap_or_default();

        let timestamp = parse_timestamp(cell(date_col)).ok_or_else(|| {
            ChatsiftError::InvalidTimestamp {
                value: cell(date_col).to_string(),
                row: i + 1,
            }
        })?;

        let content = match cell(content_col) {
            "" => None,
            text => Some(text.to_string()),
        };

        let mut record = MessageRecord {
            author_id: cell(id_col).to_string(),
            author_name: cell(author_col).to_string(),
            timestamp,
            content,
            attachment: None,
            reactions: None,
        };
        if let Some(idx) = attachment_col {
            if !cell(idx).is_empty() {
                record.attachment = Some(cell(idx).to_string());
            }
        }
        if let Some(idx) = reactions_col {
            if !cell(idx).is_empty() {
                record.reactions = Some(cell(idx).to_string());
            }
        }
        records.push(record);
    }

    let summary = summarize(&records, byte_size);
    info!(
        messages = summary.total_messages,
        authors = summary.total_authors,
        "load complete"
    );
    Ok(LoadedFile { records, summary })
}

/// Computes the load summary for a record collection.
pub fn summarize(records: &[MessageRecord], byte_size: u64) -> LoadSummary {
    let mut total_words = 0usize;
    let mut unique_words: HashSet<String> = HashSet::new();
    let mut roster: Vec<AuthorStat> = Vec::new();
    let mut roster_index: HashMap<String, usize> = HashMap::new();

    for rec in records {
        if let Some(content) = rec.content() {
            for word in content.split_whitespace() {
                total_words += 1;
                unique_words.insert(word.to_lowercase());
            }
        }

        match roster_index.get(rec.author_id()) {
            Some(&idx) => roster[idx].count += 1,
            None => {
                roster_index.insert(rec.author_id().to_string(), roster.len());
                roster.push(AuthorStat {
                    id: rec.author_id().to_string(),
                    name: rec.author_name().to_string(),
                    count: 1,
                });
            }
        }
    }

    LoadSummary {
        byte_size,
        total_messages: records.len(),
        total_authors: roster.len(),
        total_words,
        unique_words: unique_words.len(),
        date_bounds: DateBounds::from_timestamps(records.iter().map(|r| r.timestamp)),
        authors: roster,
    }
}

/// Builds the id -> display name table used for key-file lookups.
pub fn author_name_table(records: &[MessageRecord]) -> HashMap<String, String> {
    let mut table = HashMap::new();
    for rec in records {
        table
            .entry(rec.author_id().to_string())
            .or_insert_with(|| rec.author_name().to_string());
    }
    table
}

/// Loads the newline-delimited bad-word list.
///
/// Lines are trimmed and lower-cased; blanks are skipped. A missing file
/// yields an empty list (filtering disabled), not an error.
pub fn load_bad_words(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        warn!(path = %path.display(), "bad-word list not found; filter unavailable");
        return Ok(Vec::new());
    }

    let text = fs::read_to_string(path)?;
    let words: Vec<String> = text
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect();
    debug!(words = words.len(), "loaded bad-word list");
    Ok(words)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.to_utc());
    }
    for format in DATE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
        // Date-only formats need an explicit midnight.
        if let Ok(date) = chrono::NaiveDate::parse_from_str(value, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}
