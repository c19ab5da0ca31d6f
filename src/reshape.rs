//! Column reshaping of the rewritten record set.
//!
//! After the rule engine has rewritten content, the reshaper turns the
//! surviving records into an output [`Table`]: identity columns are kept,
//! dropped, or replaced by the remapped value; the timestamp column is
//! reformatted; attachment and reaction columns are rendered or dropped; and
//! consecutive same-author rows optionally have their author cells blanked.
//!
//! Every toggle is independent and driven by [`ExportSettings`]; the record
//! collection itself is never mutated.

use tracing::debug;

use crate::identity::IdentityMap;
use crate::record::MessageRecord;
use crate::settings::{
    AttachmentFormat, AuthorFormat, DateBounds, DateFormat, ExportSettings,
};

/// Column names that identify the author, in grouping-key priority order.
const AUTHOR_COLUMNS: [&str; 3] = ["AuthorID", "AuthorKey", "Author"];

/// The reshaped output: a header row plus data rows, all strings.
///
/// Absent values are empty strings, matching both output encodings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names in output order.
    pub header: Vec<String>,

    /// Data rows; every row has `header.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of a named column, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Builds the output table from rewritten records.
///
/// `rows` pairs each surviving record with its rewritten content, in output
/// order. Relative date modes use the bounds captured at load time from
/// [`ExportSettings::date_bounds`], falling back to the bounds of the given
/// rows when the caller supplied none.
pub fn build_table(
    rows: &[(MessageRecord, String)],
    settings: &ExportSettings,
    identity: &IdentityMap,
) -> Table {
    let bounds = settings
        .date_bounds
        .or_else(|| DateBounds::from_timestamps(rows.iter().map(|(rec, _)| rec.timestamp)));

    let header = build_header(settings);
    debug!(columns = header.len(), rows = rows.len(), "reshaping columns");

    let data = rows
        .iter()
        .map(|(rec, content)| build_row(rec, content, settings, identity, bounds))
        .collect();

    Table { header, rows: data }
}

fn build_header(settings: &ExportSettings) -> Vec<String> {
    let mut header = Vec::new();

    match settings.author_format {
        AuthorFormat::Both => {
            header.push("AuthorID".to_string());
            header.push("Author".to_string());
        }
        AuthorFormat::Id => header.push("AuthorID".to_string()),
        AuthorFormat::Name | AuthorFormat::Nickname | AuthorFormat::Anonymize => {
            header.push("Author".to_string());
        }
        AuthorFormat::NumericKeys => header.push("AuthorKey".to_string()),
        AuthorFormat::Omit => {}
    }

    if settings.date_format != DateFormat::Hide {
        header.push("Date".to_string());
    }

    header.push("Content".to_string());

    if settings.include_attachments {
        header.push("Attachments".to_string());
    }
    if settings.include_reactions {
        header.push("Reactions".to_string());
    }

    header
}

fn build_row(
    rec: &MessageRecord,
    content: &str,
    settings: &ExportSettings,
    identity: &IdentityMap,
    bounds: Option<DateBounds>,
) -> Vec<String> {
    let mut row = Vec::new();

    match settings.author_format {
        AuthorFormat::Both => {
            row.push(rec.author_id().to_string());
            row.push(rec.author_name().to_string());
        }
        AuthorFormat::Id => row.push(rec.author_id().to_string()),
        AuthorFormat::Name => row.push(rec.author_name().to_string()),
        AuthorFormat::Nickname | AuthorFormat::Anonymize | AuthorFormat::NumericKeys => {
            row.push(
                identity
                    .display_value(rec.author_id(), rec.author_name())
                    .unwrap_or_default(),
            );
        }
        AuthorFormat::Omit => {}
    }

    match settings.date_format {
        DateFormat::Hide => {}
        DateFormat::Show => row.push(rec.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        DateFormat::Unix => row.push(rec.timestamp.timestamp().to_string()),
        DateFormat::RelativeFirst => row.push(
            bounds
                .map(|b| (rec.timestamp - b.first).num_seconds().to_string())
                .unwrap_or_default(),
        ),
        DateFormat::RelativeLast => row.push(
            bounds
                .map(|b| (b.last - rec.timestamp).num_seconds().to_string())
                .unwrap_or_default(),
        ),
    }

    row.push(content.to_string());

    if settings.include_attachments {
        row.push(render_attachment(rec.attachment(), settings));
    }
    if settings.include_reactions {
        row.push(rec.reactions().unwrap_or_default().to_string());
    }

    row
}

fn render_attachment(attachment: Option<&str>, settings: &ExportSettings) -> String {
    let Some(att) = attachment else {
        return String::new();
    };
    match settings.attachment_format {
        AttachmentFormat::Link => att.to_string(),
        AttachmentFormat::Tag => settings.format_tag("att."),
        AttachmentFormat::Binary => "1".to_string(),
        AttachmentFormat::Filename => {
            let without_query = att.split('?').next().unwrap_or(att);
            without_query
                .rsplit('/')
                .next()
                .unwrap_or(without_query)
                .to_string()
        }
    }
}

/// Blanks the author cells of rows whose author-identifying value equals the
/// previous row's value.
///
/// The grouping key is the first present of `AuthorID`, `AuthorKey`,
/// `Author`; comparison is against the previous row's *pre-blank* value, so
/// three consecutive same-author rows blank the second and third. Rows are
/// never removed. A table without author columns is returned unchanged.
pub fn group_consecutive_rows(table: &mut Table) {
    let Some(key_col) = AUTHOR_COLUMNS.iter().find_map(|name| table.column(name)) else {
        return;
    };
    let author_cols: Vec<usize> = AUTHOR_COLUMNS
        .iter()
        .filter_map(|name| table.column(name))
        .collect();

    let mut previous: Option<String> = None;
    for row in &mut table.rows {
        let current = row[key_col].clone();
        if !current.is_empty() && previous.as_deref() == Some(current.as_str()) {
            for &col in &author_cols {
                row[col].clear();
            }
        }
        previous = Some(current);
    }
}
