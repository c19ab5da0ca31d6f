//! Command-line interface definition using clap.
//!
//! This module defines [`Args`], the full flag surface of the `chatsift`
//! binary, and its conversion into an [`ExportSettings`] value. The value
//! enums themselves (author format, date format, trim logic, ...) live next
//! to the settings they configure and derive `ValueEnum` behind the `cli`
//! feature, so the library API never depends on clap.
//!
//! # Example
//!
//! ```rust
//! use clap::Parser;
//! use chatsift::cli::Args;
//!
//! let args = Args::parse_from(["chatsift", "chat.csv", "--author-format", "anonymize"]);
//! let settings = args.to_settings().unwrap();
//! assert!(settings.author_format.is_remapped());
//! ```

use std::collections::HashMap;

use clap::Parser;

use crate::analytics::ReportKind;
use crate::error::{ChatsiftError, Result};
use crate::export::ExportFormat;
use crate::loader::load_bad_words;
use crate::settings::{
    AttachmentFormat, AuthorFormat, BadWordMode, DateFormat, ExportSettings, TrimLogic, UrlFormat,
};

/// Rewrite, anonymize, and reshape chat-log CSV exports
/// into clean CSV or fixed-width text files.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatsift")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatsift chat.csv
    chatsift chat.csv -o clean.csv --author-format anonymize --key-file
    chatsift chat.csv --after 2024-01-01 --before 2024-06-30
    chatsift chat.csv --bad-words words.txt --bad-word-mode snip-word
    chatsift chat.csv --format txt --group --compress
    chatsift chat.csv --report content")]
pub struct Args {
    /// Path to the input CSV file
    pub input: String,

    /// Path to the output file
    #[arg(short, long, default_value = "chat_export.csv")]
    pub output: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Run an analytics report over the loaded data instead of exporting
    #[arg(long, value_enum, value_name = "KIND")]
    pub report: Option<ReportKind>,

    /// Keep only messages on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub after: Option<String>,

    /// Keep only messages on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub before: Option<String>,

    /// Restrict the export to these author IDs (repeat or comma-separate)
    #[arg(long, value_name = "ID", value_delimiter = ',')]
    pub authors: Vec<String>,

    /// How to render author identity in the output
    #[arg(long, value_enum, default_value = "both")]
    pub author_format: AuthorFormat,

    /// Write export_key.txt next to the output (anonymize/numeric-keys only)
    #[arg(long)]
    pub key_file: bool,

    /// Nickname substitution for --author-format nickname (repeatable, ID=NAME)
    #[arg(long, value_name = "ID=NAME")]
    pub nickname: Vec<String>,

    /// How to render the timestamp column
    #[arg(long, value_enum, default_value = "show")]
    pub date_format: DateFormat,

    /// Blank repeated author cells on consecutive same-author rows
    #[arg(short, long)]
    pub group: bool,

    /// Strip a leading "{author}: " prefix from message content
    #[arg(long)]
    pub scrub: bool,

    /// Drop messages shorter than this many characters
    #[arg(long, value_name = "N")]
    pub min_chars: Option<usize>,

    /// Drop messages longer than this many characters
    #[arg(long, value_name = "N")]
    pub max_chars: Option<usize>,

    /// Drop messages with fewer words than this
    #[arg(long, value_name = "N")]
    pub min_words: Option<usize>,

    /// Drop messages with more words than this
    #[arg(long, value_name = "N")]
    pub max_words: Option<usize>,

    /// How multiple trim bounds combine
    #[arg(long, value_enum, default_value = "and")]
    pub trim_logic: TrimLogic,

    /// Path to a newline-separated bad-word list
    #[arg(long, value_name = "FILE")]
    pub bad_words: Option<String>,

    /// What to do when a bad word matches
    #[arg(long, value_enum, default_value = "snip-word")]
    pub bad_word_mode: BadWordMode,

    /// Replacement text for snipped words (default "<snip>")
    #[arg(long, value_name = "TEXT")]
    pub snip_replacement: Option<String>,

    /// Rewrite URLs in message content
    #[arg(long, value_enum, value_name = "MODE")]
    pub shorten_urls: Option<UrlFormat>,

    /// Collapse whitespace runs and trim each message
    #[arg(short = 'w', long)]
    pub normalize_whitespace: bool,

    /// Emit placeholder tags without angle brackets
    #[arg(long)]
    pub omit_brackets: bool,

    /// Drop the attachment column
    #[arg(long)]
    pub no_attachments: bool,

    /// How to render the attachment column
    #[arg(long, value_enum, default_value = "link")]
    pub attachment_format: AttachmentFormat,

    /// Drop the reactions column
    #[arg(long)]
    pub no_reactions: bool,

    /// Zip the finished output file (deflate), removing the original
    #[arg(short, long)]
    pub compress: bool,
}

impl Args {
    /// Builds the pipeline settings from the parsed flags.
    ///
    /// Reads the bad-word list file when `--bad-words` was given; a missing
    /// file yields an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`ChatsiftError::InvalidSettings`] for a malformed
    /// `--nickname` value, [`ChatsiftError::Io`] for an unreadable word
    /// file, and whatever [`ExportSettings::validate`] rejects.
    pub fn to_settings(&self) -> Result<ExportSettings> {
        let mut settings = ExportSettings::new()
            .with_author_format(self.author_format)
            .with_key_file(self.key_file)
            .with_selected_authors(self.authors.iter().cloned())
            .with_nicknames(parse_nicknames(&self.nickname)?)
            .with_grouping(self.group)
            .with_author_scrub(self.scrub)
            .with_date_format(self.date_format)
            .with_trim_logic(self.trim_logic)
            .with_trim_chars(self.min_chars, self.max_chars)
            .with_trim_words(self.min_words, self.max_words)
            .with_whitespace_normalization(self.normalize_whitespace)
            .with_omit_brackets(self.omit_brackets)
            .with_attachments(!self.no_attachments, self.attachment_format)
            .with_reactions(!self.no_reactions)
            .with_compression(self.compress);

        if let Some(mode) = self.shorten_urls {
            settings = settings.with_url_shortening(mode);
        }
        if let Some(ref path) = self.bad_words {
            let words = load_bad_words(path.as_ref())?;
            settings = settings.with_bad_words(self.bad_word_mode, words);
        }
        if let Some(ref replacement) = self.snip_replacement {
            settings = settings.with_snip_replacement(replacement.clone());
        }

        settings.validate()?;
        Ok(settings)
    }
}

/// Parses repeated `ID=NAME` pairs into the nickname table.
fn parse_nicknames(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut nicknames = HashMap::with_capacity(pairs.len());
    for pair in pairs {
        let Some((id, name)) = pair.split_once('=') else {
            return Err(ChatsiftError::InvalidSettings(format!(
                "invalid --nickname value '{pair}': expected ID=NAME"
            )));
        };
        if id.is_empty() {
            return Err(ChatsiftError::InvalidSettings(format!(
                "invalid --nickname value '{pair}': empty author ID"
            )));
        }
        nicknames.insert(id.to_string(), name.to_string());
    }
    Ok(nicknames)
}
