//! Per-message content transformation rules.
//!
//! [`RuleEngine`] applies the ordered rewrite stages to one message at a
//! time: author scrub, URL shortening, bad-word filtering, whitespace
//! normalization, and the trim/keep policy. The ordering is fixed; each
//! stage operates on the previous stage's output.
//!
//! The engine is pure per call: [`RuleEngine::process`] returns a
//! [`RuleOutcome`] carrying both the rewritten content (or a drop) and the
//! words snipped from that one message. Callers fold the snipped words into
//! a [`SnipHistogram`], so records can be processed in any order as long as
//! the merge happens in original order.
//!
//! # Example
//!
//! ```rust
//! use chatsift::engine::{RuleEngine, SnipHistogram};
//! use chatsift::settings::{AuthorFormat, ExportSettings, UrlFormat};
//!
//! # fn main() -> chatsift::Result<()> {
//! let settings = ExportSettings::new()
//!     .with_author_format(AuthorFormat::Name)
//!     .with_author_scrub(true)
//!     .with_url_shortening(UrlFormat::TagGeneric);
//!
//! let engine = RuleEngine::new(&settings)?;
//! let outcome = engine.process(Some("1001: check http://example.com now"), "Alice", "1001");
//! assert_eq!(outcome.content.as_deref(), Some("check <link> now"));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use regex::{NoExpand, Regex, RegexBuilder};

use crate::error::Result;
use crate::settings::{AuthorFormat, BadWordMode, ExportSettings, TrimLogic, UrlFormat};

/// Matches HTTP(S) URLs and bare `www.` links.
const URL_PATTERN: &str = r#"https?://[^\s<>"]+|www\.[^\s<>"]+"#;

/// Result of processing one message's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Rewritten content, or `None` when the message is dropped.
    pub content: Option<String>,

    /// Lower-cased bad words snipped from this message, one entry per match.
    pub snipped: Vec<String>,
}

impl RuleOutcome {
    fn drop() -> Self {
        Self::default()
    }

    fn keep(content: String) -> Self {
        Self {
            content: Some(content),
            snipped: Vec::new(),
        }
    }
}

/// Per-run histogram of snipped bad words.
///
/// Keys are lower-cased words; ordering is deterministic (sorted by word)
/// which keeps reports and tests stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnipHistogram(BTreeMap<String, u64>);

impl SnipHistogram {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one message's snipped words into the histogram.
    pub fn merge(&mut self, snipped: &[String]) {
        for word in snipped {
            *self.0.entry(word.clone()).or_insert(0) += 1;
        }
    }

    /// Total number of snipped word occurrences.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Returns `true` when nothing was snipped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top `n` words by count, ties broken alphabetically.
    pub fn top(&self, n: usize) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> =
            self.0.iter().map(|(w, c)| (w.as_str(), *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }

    /// Iterates over `(word, count)` pairs in word order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// Number of distinct snipped words.
    pub fn distinct(&self) -> usize {
        self.0.len()
    }
}

/// Compiled per-run content transformation rules.
///
/// Regexes are compiled once at construction; `process` borrows them for
/// every record of the run.
pub struct RuleEngine<'a> {
    settings: &'a ExportSettings,
    url_re: Regex,
    bad_words_re: Option<Regex>,
}

impl<'a> RuleEngine<'a> {
    /// Compiles the engine for one run.
    ///
    /// The bad-word pattern is only built when a non-empty word list was
    /// loaded and the filter mode is enabled; words are regex-escaped and
    /// matched case-insensitively on whole-word boundaries.
    pub fn new(settings: &'a ExportSettings) -> Result<Self> {
        let url_re = Regex::new(URL_PATTERN)?;

        let bad_words_re = if settings.bad_word_filter_active() {
            let alternation = settings
                .bad_words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&format!(r"\b({alternation})\b"))
                    .case_insensitive(true)
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            settings,
            url_re,
            bad_words_re,
        })
    }

    /// Applies the full rule chain to one message.
    ///
    /// Stage order: null check → author scrub → URL shortening → bad-word
    /// filtering → whitespace normalization → trim/keep. A `snip_message`
    /// hit short-circuits before normalization and trim.
    pub fn process(
        &self,
        content: Option<&str>,
        author_name: &str,
        author_id: &str,
    ) -> RuleOutcome {
        let Some(raw) = content else {
            return RuleOutcome::drop();
        };
        if raw.eq_ignore_ascii_case(crate::record::NULL_MARKER) {
            return RuleOutcome::drop();
        }

        let mut content = raw.to_string();

        if self.settings.scrub_author_from_content {
            content = self.scrub(&content, author_name, author_id);
        }

        if self.settings.shorten_urls {
            content = self.shorten_urls(&content);
        }

        let mut snipped = Vec::new();
        if let Some(re) = &self.bad_words_re {
            if re.is_match(&content) {
                match self.settings.bad_word_filter_mode {
                    BadWordMode::SnipMessage => {
                        return RuleOutcome::keep(self.settings.format_tag("message removed"));
                    }
                    BadWordMode::SnipWord => {
                        for m in re.find_iter(&content) {
                            snipped.push(m.as_str().to_lowercase());
                        }
                        let replacement = self
                            .settings
                            .snip_replacement
                            .clone()
                            .unwrap_or_else(|| self.settings.format_tag("snip"));
                        content = re.replace_all(&content, NoExpand(&replacement)).into_owned();
                    }
                    BadWordMode::Disabled => {}
                }
            }
        }

        if self.settings.normalize_whitespace {
            content = content.split_whitespace().collect::<Vec<_>>().join(" ");
        }

        if !self.keep_by_trim_policy(&content) {
            return RuleOutcome { content: None, snipped };
        }

        RuleOutcome { content: Some(content), snipped }
    }

    /// Strips a literal `"{identifier}: "` prefix from the content.
    ///
    /// Which identifiers are candidates depends on the display mode: the
    /// output keeps one identity facet, so the *other* facet is scrubbed
    /// (both when the output is a computed key). Matching is strictly
    /// literal-prefix; mid-content occurrences are never touched.
    pub fn scrub(&self, content: &str, author_name: &str, author_id: &str) -> String {
        let candidates: Vec<&str> = match self.settings.author_format {
            AuthorFormat::Id => vec![author_name],
            AuthorFormat::Name | AuthorFormat::Nickname => vec![author_id],
            AuthorFormat::NumericKeys | AuthorFormat::Anonymize => vec![author_name, author_id],
            AuthorFormat::Both | AuthorFormat::Omit => vec![],
        };

        let mut content = content.to_string();
        for item in candidates {
            if item.is_empty() {
                continue;
            }
            let prefix = format!("{item}: ");
            if let Some(rest) = content.strip_prefix(&prefix) {
                content = rest.to_string();
            }
        }
        content
    }

    fn shorten_urls(&self, content: &str) -> String {
        if self.settings.url_format_mode == UrlFormat::Blank {
            return self.url_re.replace_all(content, "").into_owned();
        }

        // Matches are taken from the original text; each occurrence is then
        // replaced left to right, first occurrence only per literal string.
        let urls: Vec<String> = self
            .url_re
            .find_iter(content)
            .map(|m| m.as_str().to_string())
            .collect();

        let mut content = content.to_string();
        for url in urls {
            let replacement = match self.settings.url_format_mode {
                UrlFormat::TagDomain => {
                    let host = url
                        .split("//")
                        .last()
                        .unwrap_or("")
                        .split('/')
                        .next()
                        .unwrap_or("");
                    if host.is_empty() {
                        self.settings.format_tag("link")
                    } else {
                        self.settings.format_tag(host)
                    }
                }
                UrlFormat::TagGeneric | UrlFormat::Blank => {
                    if url.contains("youtube.com") || url.contains("youtu.be") {
                        self.settings.format_tag("youtube")
                    } else {
                        self.settings.format_tag("link")
                    }
                }
            };
            content = content.replacen(&url, &replacement, 1);
        }
        content
    }

    /// Evaluates the trim/keep bounds against the final content.
    fn keep_by_trim_policy(&self, content: &str) -> bool {
        let s = self.settings;
        if !s.any_trim_bound() {
            return true;
        }

        let char_len = content.chars().count();
        let word_count = content.split_whitespace().count();

        match s.trim_logic {
            TrimLogic::And => {
                if s.trim_chars_min.is_some_and(|min| char_len < min) {
                    return false;
                }
                if s.trim_chars_max.is_some_and(|max| char_len > max) {
                    return false;
                }
                if s.trim_words_min.is_some_and(|min| word_count < min) {
                    return false;
                }
                if s.trim_words_max.is_some_and(|max| word_count > max) {
                    return false;
                }
                true
            }
            TrimLogic::Or => {
                let mut conditions = Vec::new();
                if let Some(min) = s.trim_chars_min {
                    conditions.push(char_len >= min);
                }
                if let Some(max) = s.trim_chars_max {
                    conditions.push(char_len <= max);
                }
                if let Some(min) = s.trim_words_min {
                    conditions.push(word_count >= min);
                }
                if let Some(max) = s.trim_words_max {
                    conditions.push(word_count <= max);
                }
                conditions.is_empty() || conditions.iter().any(|&ok| ok)
            }
        }
    }
}
