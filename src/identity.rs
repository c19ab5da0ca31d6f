//! Per-run author identity remapping.
//!
//! [`IdentityMap`] computes a stable mapping from author identifiers to
//! output display values: `User{N}` aliases, 1-based numeric keys, nickname
//! substitutions, or pass-through. The mapping is computed once per run from
//! the unique author IDs in order of first appearance and is never cached
//! across runs; the author universe may differ after filtering.
//!
//! For the anonymize and numeric-key modes the map is a bijection onto
//! `{User1..UserK}` / `{1..K}`, and re-running with the same author order
//! yields the same mapping.
//!
//! # Example
//!
//! ```rust
//! use chatsift::identity::IdentityMap;
//! use chatsift::settings::{AuthorFormat, ExportSettings};
//!
//! let settings = ExportSettings::new().with_author_format(AuthorFormat::Anonymize);
//! let map = IdentityMap::build(["1001", "1002", "1001"], &settings);
//!
//! assert_eq!(map.display_value("1001", "Alice").as_deref(), Some("User1"));
//! assert_eq!(map.display_value("1002", "Bob").as_deref(), Some("User2"));
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::settings::{AuthorFormat, ExportSettings};

/// Filename of the optional key file, written next to the export artifact.
pub const KEY_FILE_NAME: &str = "export_key.txt";

/// Stable per-run mapping from author IDs to output identity values.
#[derive(Debug, Clone)]
pub struct IdentityMap {
    format: AuthorFormat,
    nicknames: HashMap<String, String>,
    /// Author IDs in order of first appearance (remapped modes only).
    order: Vec<String>,
    /// id -> computed value (remapped modes only).
    values: HashMap<String, String>,
}

impl IdentityMap {
    /// Builds the mapping for one run.
    ///
    /// `author_ids` may contain duplicates; ranking follows the order of
    /// first appearance among the given IDs.
    pub fn build<I, S>(author_ids: I, settings: &ExportSettings) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        let mut values: HashMap<String, String> = HashMap::new();

        if settings.author_format.is_remapped() {
            for id in author_ids {
                let id = id.into();
                if values.contains_key(&id) {
                    continue;
                }
                let rank = order.len() + 1;
                let value = match settings.author_format {
                    AuthorFormat::Anonymize => format!("User{rank}"),
                    AuthorFormat::NumericKeys => rank.to_string(),
                    _ => unreachable!(),
                };
                values.insert(id.clone(), value);
                order.push(id);
            }
        }

        Self {
            format: settings.author_format,
            nicknames: settings.nicknames.clone(),
            order,
            values,
        }
    }

    /// Returns the display mode the map was built for.
    pub fn format(&self) -> AuthorFormat {
        self.format
    }

    /// Returns `true` when the map substitutes computed identity values.
    pub fn is_remapped(&self) -> bool {
        self.format.is_remapped()
    }

    /// Number of mapped authors (remapped modes only; 0 otherwise).
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` when no authors are mapped.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolves the output identity value for one author.
    ///
    /// - Anonymize / numeric keys: the computed value (`None` for an author
    ///   absent from the run's set — callers filter first, so this means a
    ///   bookkeeping bug upstream).
    /// - Nickname: the caller-supplied nickname, falling back to the
    ///   original name when absent or blank.
    /// - Every other mode: `None`; identity columns pass through unchanged
    ///   and the reshaper decides what to keep or drop.
    pub fn display_value(&self, author_id: &str, author_name: &str) -> Option<String> {
        match self.format {
            AuthorFormat::Anonymize | AuthorFormat::NumericKeys => {
                self.values.get(author_id).cloned()
            }
            AuthorFormat::Nickname => {
                let nick = self.nicknames.get(author_id).map(String::as_str);
                match nick {
                    Some(n) if !n.trim().is_empty() => Some(n.to_string()),
                    _ => Some(author_name.to_string()),
                }
            }
            _ => None,
        }
    }

    /// Iterates `(author_id, value)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().map(|id| {
            let value = self.values.get(id).map(String::as_str).unwrap_or_default();
            (id.as_str(), value)
        })
    }

    /// Renders the human-readable key file listing.
    ///
    /// `original_names` is sourced from the *unfiltered* dataset so the
    /// lookup cannot fail for a mapped author even when rows were filtered
    /// out; a genuinely unknown ID renders as `N/A`.
    pub fn render_key_file(&self, original_names: &HashMap<String, String>) -> String {
        let mut out = String::from("Export Key\n===================\n");
        for (id, value) in self.iter() {
            let name = original_names.get(id).map(String::as_str).unwrap_or("N/A");
            out.push_str(&format!("{value}: {name} ({id})\n"));
        }
        out
    }

    /// Writes `export_key.txt` next to the export destination.
    ///
    /// Returns the path of the written key file.
    pub fn write_key_file(
        &self,
        destination: &Path,
        original_names: &HashMap<String, String>,
    ) -> Result<PathBuf> {
        let key_path = destination
            .parent()
            .map(|dir| dir.join(KEY_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(KEY_FILE_NAME));

        let mut file = fs::File::create(&key_path)?;
        file.write_all(self.render_key_file(original_names).as_bytes())?;
        info!(path = %key_path.display(), authors = self.len(), "wrote export key file");
        Ok(key_path)
    }
}
