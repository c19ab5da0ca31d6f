//! # Chatsift
//!
//! A Rust library for cleaning, anonymizing, and reshaping chat-log CSV
//! exports into publishable CSV or fixed-width text files.
//!
//! ## Overview
//!
//! Chatsift takes one chat log export (a CSV with `AuthorID`, `Author`,
//! `Date`, `Content` and optional `Attachments`/`Reactions` columns) and
//! runs it through a configurable pipeline:
//!
//! - **Content rules** — author-prefix scrubbing, URL shortening, bad-word
//!   snipping, whitespace normalization, and length/word-count trimming
//! - **Identity remapping** — anonymous `User N` labels, stable numeric
//!   keys, or per-author nicknames, with an optional key file on disk
//! - **Column reshaping** — timestamp display modes, attachment and
//!   reaction rendering, consecutive-message grouping
//! - **Analytics** — dry-run reports that predict what an export with the
//!   current settings would do, without writing anything
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use chatsift::prelude::*;
//! use chatsift::settings::AuthorFormat;
//!
//! fn main() -> Result<()> {
//!     let loaded = load_csv(Path::new("chat.csv"))?;
//!
//!     let settings = ExportSettings::new()
//!         .with_author_format(AuthorFormat::Anonymize)
//!         .with_key_file(true)
//!         .with_whitespace_normalization(true);
//!
//!     let report = export(
//!         &loaded.records,
//!         &settings,
//!         ExportFormat::Csv,
//!         Path::new("clean.csv"),
//!         &no_progress(),
//!     )?;
//!
//!     println!("wrote {} rows ({})", report.rows_written, report.human_size());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`loader`] — CSV ingestion and load-time aggregates
//!   ([`load_csv`](loader::load_csv), [`LoadSummary`](loader::LoadSummary))
//! - [`settings`] — [`ExportSettings`](settings::ExportSettings) and its
//!   value enums
//! - [`engine`] — the per-message content rule pipeline
//!   ([`RuleEngine`](engine::RuleEngine), [`SnipHistogram`](engine::SnipHistogram))
//! - [`identity`] — author identity remapping and the key file
//!   ([`IdentityMap`](identity::IdentityMap))
//! - [`reshape`] — tabular layout ([`Table`](reshape::Table),
//!   [`build_table`](reshape::build_table), consecutive grouping)
//! - [`export`] — the orchestrator ([`export`](export::export),
//!   [`ExportReport`](export::ExportReport))
//! - [`analytics`] — read-only reports ([`ReportKind`](analytics::ReportKind))
//! - [`filter`] — date-range filtering ([`DateRange`](filter::DateRange))
//! - [`progress`] — progress callbacks for long exports
//! - [`cli`] — clap argument surface (behind the `cli` feature)
//! - [`error`] — unified error types ([`ChatsiftError`], [`Result`])
//! - [`prelude`] — convenient re-exports

pub mod analytics;
#[cfg(feature = "cli")]
pub mod cli;
pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod identity;
pub mod loader;
pub mod progress;
pub mod record;
pub mod reshape;
pub mod settings;

// Re-export the main types at the crate root for convenience
pub use error::{ChatsiftError, Result};
pub use record::MessageRecord;

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use chatsift::prelude::*;
/// ```
pub mod prelude {
    // Core record type
    pub use crate::MessageRecord;

    // Error types
    pub use crate::error::{ChatsiftError, Result};

    // Loading
    pub use crate::loader::{LoadSummary, LoadedFile, load_csv};

    // Configuration
    pub use crate::settings::ExportSettings;

    // Content rules
    pub use crate::engine::{RuleEngine, RuleOutcome, SnipHistogram};

    // Identity remapping
    pub use crate::identity::IdentityMap;

    // Date filtering
    pub use crate::filter::{DateRange, filter_by_date};

    // Export pipeline
    pub use crate::export::{ExportFormat, ExportReport, export};

    // Analytics
    pub use crate::analytics::{ReportKind, run_report};

    // Progress reporting
    pub use crate::progress::{ProgressFn, ProgressUpdate, no_progress, stderr_progress};
}
