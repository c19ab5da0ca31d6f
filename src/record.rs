//! The message record type shared by every pipeline stage.
//!
//! This module provides [`MessageRecord`], the normalized representation of
//! one row of a chat log export. The loader converts CSV rows into this
//! structure; the rule engine, reshaper and analytics all consume it.
//!
//! # Overview
//!
//! A record consists of:
//! - **Required**: `author_id`, `author_name` and `timestamp`
//! - **Content**: `content`, which may be absent (deleted/system messages)
//! - **Optional**: `attachment` and `reactions`
//!
//! # Examples
//!
//! ```
//! use chatsift::record::MessageRecord;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
//! let rec = MessageRecord::new("1001", "Alice", ts, "Hello, world!")
//!     .with_attachment("https://cdn.example.com/pic.png?size=large");
//!
//! assert_eq!(rec.author_name(), "Alice");
//! assert!(rec.attachment().is_some());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for absent content, inherited from upstream CSV exports where
/// missing cells round-trip as the literal string "nan".
pub const NULL_MARKER: &str = "nan";

/// One row of a chat log export, normalized for pipeline processing.
///
/// The invariant from loading holds throughout: all records sharing an
/// `author_id` within one load carry the same `author_name`.
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `author_id` | `String` | Opaque stable identifier for the author |
/// | `author_name` | `String` | Display name of the author |
/// | `timestamp` | `DateTime<Utc>` | When the message was sent (timezone-naive inputs are read as UTC) |
/// | `content` | `Option<String>` | Text content; `None` for absent content |
/// | `attachment` | `Option<String>` | URL or path of an attached file |
/// | `reactions` | `Option<String>` | Pre-rendered reaction summary |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Opaque stable identifier for the message author.
    pub author_id: String,

    /// Display name of the message author.
    pub author_name: String,

    /// When the message was sent.
    pub timestamp: DateTime<Utc>,

    /// Text content of the message.
    ///
    /// `None` when the export carried no content cell. The rule engine also
    /// treats the literal [`NULL_MARKER`] as absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub content: Option<String>,

    /// URL or path of an attached file, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub attachment: Option<String>,

    /// Reaction summary string, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub reactions: Option<String>,
}

impl MessageRecord {
    /// Creates a new record with the required fields and content.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatsift::record::MessageRecord;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    /// let rec = MessageRecord::new("42", "Bob", ts, "hi");
    /// assert_eq!(rec.author_id(), "42");
    /// ```
    pub fn new(
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            author_name: author_name.into(),
            timestamp,
            content: Some(content.into()),
            attachment: None,
            reactions: None,
        }
    }

    /// Creates a record with no content (deleted or system message).
    pub fn without_content(
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            author_id: author_id.into(),
            author_name: author_name.into(),
            timestamp,
            content: None,
            attachment: None,
            reactions: None,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Builder method to set the attachment reference.
    #[must_use]
    pub fn with_attachment(mut self, att: impl Into<String>) -> Self {
        self.attachment = Some(att.into());
        self
    }

    /// Builder method to set the reaction summary.
    #[must_use]
    pub fn with_reactions(mut self, reactions: impl Into<String>) -> Self {
        self.reactions = Some(reactions.into());
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the author identifier.
    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    /// Returns the author display name.
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Returns the message content, if present.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns the attachment reference, if present.
    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    /// Returns the reaction summary, if present.
    pub fn reactions(&self) -> Option<&str> {
        self.reactions.as_deref()
    }

    // =========================================================================
    // Utility methods
    // =========================================================================

    /// Returns `true` if the content is absent or equals the null marker.
    ///
    /// This is the rule engine's step-1 DROP predicate.
    pub fn is_content_missing(&self) -> bool {
        match self.content.as_deref() {
            None => true,
            Some(text) => text.eq_ignore_ascii_case(NULL_MARKER),
        }
    }
}
