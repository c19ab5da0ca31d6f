//! Unified error types for chatsift.
//!
//! This module provides a single [`ChatsiftError`] enum that covers all error
//! cases in the library, following the pattern used by popular crates like
//! `reqwest`, `serde_json`, and `csv`.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **Developers** get source error chains for debugging
//!
//! Errors fall into three families mirroring the pipeline stages: settings
//! validation errors are raised before a run starts, data errors are raised
//! while loading the input file, and runtime errors abort the run in flight.
//! Nothing is retried; every failure is terminal for that invocation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatsift operations.
///
/// # Example
///
/// ```rust
/// use chatsift::error::Result;
/// use chatsift::record::MessageRecord;
///
/// fn my_function() -> Result<Vec<MessageRecord>> {
///     // ... operations that may fail
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatsiftError>;

/// The error type for all chatsift operations.
///
/// Each variant contains context about what went wrong and, where applicable,
/// the underlying source error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatsiftError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The input file doesn't exist
    /// - Permission denied
    /// - Disk is full (when writing output)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV reading or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from the input file.
    ///
    /// The input must carry `AuthorID`, `Author`, `Date` and `Content`
    /// headers; `Attachments` and `Reactions` are optional.
    #[error("Input file{} is missing required column '{column}'", path.as_ref().map(|p| format!(" '{}'", p.display())).unwrap_or_default())]
    MissingColumn {
        /// Name of the missing column
        column: &'static str,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// A timestamp cell could not be parsed.
    ///
    /// Reported as a load failure; no partial record set is retained.
    #[error("Unparseable timestamp '{value}' at row {row}")]
    InvalidTimestamp {
        /// The offending cell value
        value: String,
        /// 1-based data row index (header excluded)
        row: usize,
    },

    /// Invalid date string in a date-range filter.
    ///
    /// Date filters expect YYYY-MM-DD format.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// The settings structure failed validation before the pipeline started.
    ///
    /// Raised synchronously; the pipeline never runs on invalid settings.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A regex pattern failed to compile.
    ///
    /// Bad-word lists are escaped before compilation, so in practice this
    /// only fires on pathologically long word lists.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Archive creation error during the optional compression step.
    ///
    /// Compression is best-effort: the orchestrator reports this separately
    /// from the export outcome rather than failing the run.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ChatsiftError {
    /// Creates an [`InvalidDate`](Self::InvalidDate) error for a filter string.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Creates a [`MissingColumn`](Self::MissingColumn) error without a path.
    pub fn missing_column(column: &'static str) -> Self {
        Self::MissingColumn { column, path: None }
    }

    /// Returns `true` if this error was raised before the pipeline started
    /// (settings or filter validation), as opposed to during a run.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidDate { .. } | Self::InvalidSettings(_))
    }
}
