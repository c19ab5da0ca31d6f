//! Export orchestration: the full pipeline over one record collection.
//!
//! [`export`] sequences the run: author-subset filtering, per-record content
//! rewriting through the rule engine, identity remapping, column reshaping,
//! optional consecutive grouping, and serialization to one of the two output
//! encodings. Progress milestones are pushed through the caller's callback;
//! percent values only ever increase and end at 100.
//!
//! The call blocks until the run completes or fails. It makes no threading
//! assumptions — callers wanting a responsive front-end run it on their own
//! task or thread and marshal the callbacks themselves. There is no
//! cancellation; a run either finishes or returns the failure that aborted
//! it. Partial output files from a failed run are not cleaned up.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatsift::export::{export, ExportFormat};
//! use chatsift::progress::stderr_progress;
//! use chatsift::settings::ExportSettings;
//! use std::path::Path;
//!
//! # fn main() -> chatsift::Result<()> {
//! let records = vec![];
//! let settings = ExportSettings::new();
//! let report = export(
//!     &records,
//!     &settings,
//!     ExportFormat::Csv,
//!     Path::new("out.csv"),
//!     &stderr_progress(),
//! )?;
//! println!("wrote {} rows", report.rows_written);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::{RuleEngine, SnipHistogram};
use crate::error::{ChatsiftError, Result};
use crate::identity::IdentityMap;
use crate::loader::author_name_table;
use crate::progress::{ProgressFn, ProgressUpdate};
use crate::record::MessageRecord;
use crate::reshape::{Table, build_table, group_consecutive_rows};
use crate::settings::ExportSettings;

/// UTF-8 byte-order mark prefixed to CSV output for spreadsheet tooling.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Batch size for content-processing progress updates.
const PROGRESS_BATCH: usize = 250;

/// Output encoding for the export artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-delimited, quoted as needed, header row, UTF-8 with BOM (default).
    #[default]
    Csv,

    /// Fixed-width human-readable table dump.
    Txt,
}

impl ExportFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "CSV"),
            ExportFormat::Txt => write!(f, "TXT"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Txt),
            _ => Err(format!("Unknown format: '{s}'. Expected one of: csv, txt")),
        }
    }
}

/// Success metrics of one export run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Data rows written (header excluded).
    pub rows_written: usize,

    /// Size of the final artifact in bytes.
    pub bytes_written: u64,

    /// Histogram of words snipped by the bad-word filter.
    pub snipped_words: SnipHistogram,

    /// Final artifact path; the `.zip` when compression succeeded.
    pub output_path: PathBuf,

    /// Path of the key file, when one was written.
    pub key_file: Option<PathBuf>,

    /// Cause of a best-effort compression failure. The uncompressed artifact
    /// at `output_path` is still valid when this is set.
    pub compression_error: Option<String>,
}

impl ExportReport {
    /// Human-readable artifact size, e.g. `12.34 KB`.
    pub fn human_size(&self) -> String {
        format!("{:.2} KB", self.bytes_written as f64 / 1024.0)
    }
}

/// Runs the full export pipeline over `records`.
///
/// `records` is the caller's (possibly date-filtered) view; the key file
/// sources author names from this same collection *before* the author-subset
/// filter, so every mapped author resolves. Settings are re-validated on
/// entry so invalid configurations never reach the rule engine.
///
/// # Errors
///
/// Any failure during rewrite, reshape, or serialization aborts the run and
/// is returned as the cause; partial output is not cleaned up. A compression
/// failure after a successful serialization is *not* an error: the report
/// carries it in [`ExportReport::compression_error`].
pub fn export(
    records: &[MessageRecord],
    settings: &ExportSettings,
    format: ExportFormat,
    destination: &Path,
    progress: &ProgressFn,
) -> Result<ExportReport> {
    settings.validate()?;
    info!(records = records.len(), %format, dest = %destination.display(), "starting export");

    progress(&ProgressUpdate::new(5, "Preparing data..."));

    let subset: Vec<&MessageRecord> = if settings.selected_author_ids.is_empty() {
        records.iter().collect()
    } else {
        records
            .iter()
            .filter(|rec| settings.selected_author_ids.contains(rec.author_id()))
            .collect()
    };

    // Mapping is computed once, up front, from the filtered set in first
    // appearance order; trim drops later in the run cannot change numbering.
    let identity = IdentityMap::build(
        subset.iter().map(|rec| rec.author_id().to_string()),
        settings,
    );

    let key_file = if settings.create_key_file && settings.author_format.is_remapped() {
        let names = author_name_table(records);
        Some(identity.write_key_file(destination, &names)?)
    } else {
        None
    };

    let engine = RuleEngine::new(settings)?;
    let mut histogram = SnipHistogram::new();
    let mut rewritten: Vec<(MessageRecord, String)> = Vec::with_capacity(subset.len());

    let total = subset.len();
    for (i, rec) in subset.iter().enumerate() {
        let outcome = engine.process(rec.content(), rec.author_name(), rec.author_id());
        histogram.merge(&outcome.snipped);
        if let Some(content) = outcome.content {
            rewritten.push(((*rec).clone(), content));
        }

        if i % PROGRESS_BATCH == 0 || i + 1 == total {
            let percent = 15 + (((i + 1) as f64 / total as f64) * 45.0) as u8;
            progress(&ProgressUpdate::new(
                percent,
                format!("Processing message content ({}/{total})...", i + 1),
            ));
        }
    }

    progress(&ProgressUpdate::new(75, "Formatting columns..."));
    let mut table = build_table(&rewritten, settings, &identity);

    if settings.group_consecutive {
        progress(&ProgressUpdate::new(85, "Grouping consecutive messages..."));
        group_consecutive_rows(&mut table);
    }

    progress(&ProgressUpdate::new(90, format!("Writing {format} file...")));
    match format {
        ExportFormat::Csv => write_csv(&table, destination)?,
        ExportFormat::Txt => fs::write(destination, render_fixed_width(&table))?,
    }

    let mut output_path = destination.to_path_buf();
    let mut compression_error = None;
    if settings.compress_output {
        match compress_artifact(destination) {
            Ok(zip_path) => output_path = zip_path,
            Err(err) => {
                warn!(error = %err, "compression failed; keeping uncompressed output");
                compression_error = Some(err.to_string());
            }
        }
    }

    let bytes_written = fs::metadata(&output_path)?.len();
    progress(&ProgressUpdate::new(100, "Export complete."));
    info!(rows = table.row_count(), bytes = bytes_written, "export finished");

    Ok(ExportReport {
        rows_written: table.row_count(),
        bytes_written,
        snipped_words: histogram,
        output_path,
        key_file,
        compression_error,
    })
}

/// Writes the table as BOM-prefixed, comma-delimited CSV.
fn write_csv(table: &Table, destination: &Path) -> Result<()> {
    let mut file = fs::File::create(destination)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new().from_writer(file);
    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders the table as a fixed-width text dump.
///
/// Columns are padded to their widest cell and right-aligned, separated by
/// two spaces.
fn render_fixed_width(table: &Table) -> String {
    let mut widths: Vec<usize> = table.header.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render_line = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let pad = widths[i].saturating_sub(cell.chars().count());
                format!("{}{}", " ".repeat(pad), cell)
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = render_line(&table.header);
    for row in &table.rows {
        out.push('\n');
        out.push_str(&render_line(row));
    }
    out.push('\n');
    out
}

/// Zips the finished artifact into a sibling `.zip` and removes the
/// uncompressed file. Returns the archive path.
fn compress_artifact(path: &Path) -> Result<PathBuf> {
    let zip_path = path.with_extension("zip");
    let archive = fs::File::create(&zip_path)?;
    let mut writer = zip::ZipWriter::new(archive);

    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    let entry_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ChatsiftError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "output path has no file name",
            ))
        })?;

    writer.start_file(entry_name, options)?;
    let mut source = fs::File::open(path)?;
    std::io::copy(&mut source, &mut writer)?;
    writer.finish()?;

    fs::remove_file(path)?;
    info!(path = %zip_path.display(), "compressed output artifact");
    Ok(zip_path)
}
