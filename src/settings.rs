//! Pipeline configuration types.
//!
//! This module provides [`ExportSettings`], the immutable description of one
//! export or analysis run, plus the enums for each pipeline knob. Settings
//! are built once by the caller (CLI, embedding application), validated with
//! [`ExportSettings::validate`], and then passed by reference through the
//! pipeline; invalid settings never reach the rule engine.
//!
//! # Example
//!
//! ```rust
//! use chatsift::settings::{AuthorFormat, ExportSettings, UrlFormat};
//!
//! let settings = ExportSettings::new()
//!     .with_author_format(AuthorFormat::Anonymize)
//!     .with_key_file(true)
//!     .with_url_shortening(UrlFormat::TagGeneric)
//!     .with_trim_chars(Some(3), None);
//!
//! assert!(settings.validate().is_ok());
//! ```

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChatsiftError, Result};

/// How author identity appears in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum AuthorFormat {
    /// Keep both the ID and the name column (default).
    #[default]
    Both,

    /// Keep only the name column.
    Name,

    /// Keep only the ID column.
    Id,

    /// Replace names with caller-supplied nicknames, falling back to the
    /// original name where no nickname is set.
    Nickname,

    /// Replace both columns with a stable `User{N}` alias.
    Anonymize,

    /// Drop both identity columns.
    Omit,

    /// Replace both columns with a stable 1-based numeric key.
    NumericKeys,
}

impl AuthorFormat {
    /// Returns `true` for the modes that substitute a computed identity
    /// (and therefore can emit a key file).
    pub fn is_remapped(&self) -> bool {
        matches!(self, Self::Anonymize | Self::NumericKeys)
    }
}

/// How the timestamp column is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// Formatted instant, `YYYY-MM-DD HH:MM:SS` (default).
    #[default]
    Show,

    /// Drop the column entirely.
    Hide,

    /// Signed seconds since the run's earliest timestamp.
    RelativeFirst,

    /// Signed seconds until the run's latest timestamp.
    RelativeLast,

    /// Epoch seconds.
    Unix,
}

/// Combinator for the trim/keep bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "UPPERCASE")]
pub enum TrimLogic {
    /// Drop the message if *any* enabled bound is violated (default).
    #[default]
    And,

    /// Keep the message if *any* enabled bound is satisfied; drop only when
    /// at least one bound is enabled and none hold.
    Or,
}

/// Bad-word filter behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BadWordMode {
    /// No filtering (default).
    #[default]
    Disabled,

    /// Replace each matched word with the snip replacement.
    SnipWord,

    /// Replace the whole message with a placeholder on any match.
    SnipMessage,
}

/// How matched URLs are rewritten when URL shortening is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum UrlFormat {
    /// `<youtube>` for YouTube links, `<link>` for everything else (default).
    #[default]
    TagGeneric,

    /// `<hostname>` with the path stripped, `<link>` on parse failure.
    TagDomain,

    /// Delete every matched URL.
    Blank,
}

/// How the attachment column is rendered when attachments are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum AttachmentFormat {
    /// Full original reference (default).
    #[default]
    Link,

    /// `<att.>` placeholder tag.
    Tag,

    /// Bare filename with any query string stripped.
    Filename,

    /// `1` when an attachment is present, empty otherwise.
    Binary,
}

/// First and last timestamps of the unfiltered load.
///
/// Captured once, before any export-subset filtering, so relative date
/// values stay comparable across runs on the same load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    /// Earliest timestamp in the loaded collection.
    pub first: DateTime<Utc>,

    /// Latest timestamp in the loaded collection.
    pub last: DateTime<Utc>,
}

impl DateBounds {
    /// Computes bounds from a timestamp iterator. Returns `None` when empty.
    pub fn from_timestamps(timestamps: impl IntoIterator<Item = DateTime<Utc>>) -> Option<Self> {
        let mut iter = timestamps.into_iter();
        let first_seen = iter.next()?;
        let (mut first, mut last) = (first_seen, first_seen);
        for ts in iter {
            if ts < first {
                first = ts;
            }
            if ts > last {
                last = ts;
            }
        }
        Some(Self { first, last })
    }
}

/// Full configuration of one export or analysis run.
///
/// Immutable once built; the pipeline only ever borrows it. Defaults are the
/// pass-through configuration: both identity columns kept, timestamps shown,
/// no content rewriting, attachments and reactions included.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Output identity mode.
    pub author_format: AuthorFormat,

    /// Emit `export_key.txt` alongside the output (anonymize/numeric keys only).
    pub create_key_file: bool,

    /// Restrict the export to these author IDs. Empty set = no filter.
    pub selected_author_ids: HashSet<String>,

    /// Per-author nickname substitutions for [`AuthorFormat::Nickname`].
    pub nicknames: HashMap<String, String>,

    /// Blank out repeated author cells on consecutive same-author rows.
    pub group_consecutive: bool,

    /// Strip a literal `"{identifier}: "` prefix from message content.
    pub scrub_author_from_content: bool,

    /// Timestamp column rendering.
    pub date_format: DateFormat,

    /// First/last timestamps of the unfiltered load, for the relative modes.
    pub date_bounds: Option<DateBounds>,

    /// Combinator for the trim bounds.
    pub trim_logic: TrimLogic,

    /// Minimum content length in characters. `None` = disabled.
    pub trim_chars_min: Option<usize>,

    /// Maximum content length in characters. `None` = disabled.
    pub trim_chars_max: Option<usize>,

    /// Minimum whitespace-delimited word count. `None` = disabled.
    pub trim_words_min: Option<usize>,

    /// Maximum whitespace-delimited word count. `None` = disabled.
    pub trim_words_max: Option<usize>,

    /// Bad-word filter behavior.
    pub bad_word_filter_mode: BadWordMode,

    /// Lower-cased bad-word list. Empty list disables filtering regardless
    /// of mode; a missing word file is not an error.
    pub bad_words: Vec<String>,

    /// Replacement text for [`BadWordMode::SnipWord`]. `None` uses the
    /// default `<snip>` tag (bare `snip` when brackets are omitted).
    pub snip_replacement: Option<String>,

    /// Enable URL rewriting.
    pub shorten_urls: bool,

    /// URL rewriting mode.
    pub url_format_mode: UrlFormat,

    /// Collapse whitespace runs and trim the result.
    pub normalize_whitespace: bool,

    /// Emit placeholder tags without angle brackets.
    pub omit_brackets: bool,

    /// Keep the attachment column.
    pub include_attachments: bool,

    /// Keep the reactions column.
    pub include_reactions: bool,

    /// Attachment column rendering.
    pub attachment_format: AttachmentFormat,

    /// Compress the finished artifact into a sibling `.zip`, removing the
    /// uncompressed file on success. Best-effort; failure is non-fatal.
    pub compress_output: bool,
}

impl ExportSettings {
    /// Creates the pass-through configuration.
    pub fn new() -> Self {
        Self {
            include_attachments: true,
            include_reactions: true,
            ..Self::default()
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Sets the author display mode.
    #[must_use]
    pub fn with_author_format(mut self, format: AuthorFormat) -> Self {
        self.author_format = format;
        self
    }

    /// Enables or disables key-file emission.
    #[must_use]
    pub fn with_key_file(mut self, create: bool) -> Self {
        self.create_key_file = create;
        self
    }

    /// Restricts the export to the given author IDs.
    #[must_use]
    pub fn with_selected_authors<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_author_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the nickname table.
    #[must_use]
    pub fn with_nicknames(mut self, nicknames: HashMap<String, String>) -> Self {
        self.nicknames = nicknames;
        self
    }

    /// Enables consecutive-author grouping.
    #[must_use]
    pub fn with_grouping(mut self, enabled: bool) -> Self {
        self.group_consecutive = enabled;
        self
    }

    /// Enables author-prefix scrubbing.
    #[must_use]
    pub fn with_author_scrub(mut self, enabled: bool) -> Self {
        self.scrub_author_from_content = enabled;
        self
    }

    /// Sets the timestamp rendering mode.
    #[must_use]
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.date_format = format;
        self
    }

    /// Sets the run's date bounds for the relative modes.
    #[must_use]
    pub fn with_date_bounds(mut self, bounds: DateBounds) -> Self {
        self.date_bounds = Some(bounds);
        self
    }

    /// Sets the trim combinator.
    #[must_use]
    pub fn with_trim_logic(mut self, logic: TrimLogic) -> Self {
        self.trim_logic = logic;
        self
    }

    /// Sets the character-count bounds.
    #[must_use]
    pub fn with_trim_chars(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.trim_chars_min = min;
        self.trim_chars_max = max;
        self
    }

    /// Sets the word-count bounds.
    #[must_use]
    pub fn with_trim_words(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.trim_words_min = min;
        self.trim_words_max = max;
        self
    }

    /// Sets the bad-word filter mode and word list.
    #[must_use]
    pub fn with_bad_words<I, S>(mut self, mode: BadWordMode, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bad_word_filter_mode = mode;
        self.bad_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a custom snip replacement string (used verbatim, not bracketed).
    #[must_use]
    pub fn with_snip_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.snip_replacement = Some(replacement.into());
        self
    }

    /// Enables URL shortening in the given mode.
    #[must_use]
    pub fn with_url_shortening(mut self, mode: UrlFormat) -> Self {
        self.shorten_urls = true;
        self.url_format_mode = mode;
        self
    }

    /// Enables whitespace normalization.
    #[must_use]
    pub fn with_whitespace_normalization(mut self, enabled: bool) -> Self {
        self.normalize_whitespace = enabled;
        self
    }

    /// Renders placeholder tags without angle brackets.
    #[must_use]
    pub fn with_omit_brackets(mut self, omit: bool) -> Self {
        self.omit_brackets = omit;
        self
    }

    /// Controls the attachment column.
    #[must_use]
    pub fn with_attachments(mut self, include: bool, format: AttachmentFormat) -> Self {
        self.include_attachments = include;
        self.attachment_format = format;
        self
    }

    /// Controls the reactions column.
    #[must_use]
    pub fn with_reactions(mut self, include: bool) -> Self {
        self.include_reactions = include;
        self
    }

    /// Enables output compression.
    #[must_use]
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress_output = compress;
        self
    }

    // =========================================================================
    // Validation and helpers
    // =========================================================================

    /// Validates the settings before they enter the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ChatsiftError::InvalidSettings`] when an enabled minimum
    /// bound exceeds its enabled maximum.
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.trim_chars_min, self.trim_chars_max) {
            if min > max {
                return Err(ChatsiftError::InvalidSettings(format!(
                    "trim_chars_min ({min}) exceeds trim_chars_max ({max})"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.trim_words_min, self.trim_words_max) {
            if min > max {
                return Err(ChatsiftError::InvalidSettings(format!(
                    "trim_words_min ({min}) exceeds trim_words_max ({max})"
                )));
            }
        }
        Ok(())
    }

    /// Returns `true` when bad-word filtering is effective: a non-empty word
    /// list was loaded and the mode is not disabled.
    pub fn bad_word_filter_active(&self) -> bool {
        self.bad_word_filter_mode != BadWordMode::Disabled && !self.bad_words.is_empty()
    }

    /// Returns `true` when records from this author pass the selection
    /// filter. An empty selection selects everyone.
    pub fn is_author_selected(&self, author_id: &str) -> bool {
        self.selected_author_ids.is_empty() || self.selected_author_ids.contains(author_id)
    }

    /// Returns `true` when any trim bound is enabled.
    pub fn any_trim_bound(&self) -> bool {
        self.trim_chars_min.is_some()
            || self.trim_chars_max.is_some()
            || self.trim_words_min.is_some()
            || self.trim_words_max.is_some()
    }

    /// Wraps a tag name in angle brackets unless brackets are omitted.
    pub fn format_tag(&self, tag: &str) -> String {
        if self.omit_brackets {
            tag.to_string()
        } else {
            format!("<{tag}>")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults_pass_through() {
        let settings = ExportSettings::new();
        assert_eq!(settings.author_format, AuthorFormat::Both);
        assert_eq!(settings.date_format, DateFormat::Show);
        assert!(settings.include_attachments);
        assert!(settings.include_reactions);
        assert!(!settings.shorten_urls);
        assert!(!settings.any_trim_bound());
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let bad_chars = ExportSettings::new().with_trim_chars(Some(10), Some(5));
        assert!(matches!(
            bad_chars.validate(),
            Err(ChatsiftError::InvalidSettings(_))
        ));

        let bad_words = ExportSettings::new().with_trim_words(Some(4), Some(2));
        assert!(bad_words.validate().is_err());

        let ok = ExportSettings::new().with_trim_chars(Some(5), Some(10));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_bad_word_filter_active() {
        let no_words = ExportSettings::new().with_bad_words::<_, String>(BadWordMode::SnipWord, []);
        assert!(!no_words.bad_word_filter_active());

        let disabled = ExportSettings::new().with_bad_words(BadWordMode::Disabled, ["heck"]);
        assert!(!disabled.bad_word_filter_active());

        let active = ExportSettings::new().with_bad_words(BadWordMode::SnipWord, ["heck"]);
        assert!(active.bad_word_filter_active());
    }

    #[test]
    fn test_format_tag() {
        let bracketed = ExportSettings::new();
        assert_eq!(bracketed.format_tag("link"), "<link>");

        let bare = ExportSettings::new().with_omit_brackets(true);
        assert_eq!(bare.format_tag("link"), "link");
    }

    #[test]
    fn test_is_remapped() {
        assert!(AuthorFormat::Anonymize.is_remapped());
        assert!(AuthorFormat::NumericKeys.is_remapped());
        assert!(!AuthorFormat::Both.is_remapped());
        assert!(!AuthorFormat::Nickname.is_remapped());
    }

    #[test]
    fn test_date_bounds_from_timestamps() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let bounds = DateBounds::from_timestamps([b, a, c]).unwrap();
        assert_eq!(bounds.first, a);
        assert_eq!(bounds.last, b);

        assert!(DateBounds::from_timestamps([]).is_none());
    }
}
