//! Filter record collections by date range.
//!
//! A [`DateRange`] is built from `YYYY-MM-DD` strings before the pipeline
//! starts; a malformed string is rejected synchronously with
//! [`ChatsiftError::InvalidDate`] and the run never begins. Filtering
//! produces a new collection and never mutates the original snapshot.
//!
//! # Example
//!
//! ```rust
//! use chatsift::filter::{DateRange, filter_by_date};
//! use chatsift::record::MessageRecord;
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> chatsift::Result<()> {
//! let records = vec![
//!     MessageRecord::new("1", "Alice", Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(), "old"),
//!     MessageRecord::new("1", "Alice", Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(), "new"),
//! ];
//!
//! let range = DateRange::new(Some("2024-06-01"), Some("2024-12-31"))?;
//! let filtered = filter_by_date(&records, &range);
//! assert_eq!(filtered.len(), 1);
//! assert_eq!(filtered[0].content(), Some("new"));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ChatsiftError, Result};
use crate::record::MessageRecord;

/// An inclusive date range for filtering a loaded collection.
///
/// The start bound snaps to the start of its day and the end bound to
/// 23:59:59, so both named days are fully included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Include only records on or after this instant.
    pub start: Option<DateTime<Utc>>,

    /// Include only records on or before this instant.
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Parses an inclusive range from optional `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns [`ChatsiftError::InvalidDate`] for a malformed string. The
    /// upstream tool silently fell back to the unfiltered set here; this
    /// implementation treats the malformed string as a hard validation
    /// failure instead, so a run can never proceed on an accidentally
    /// unfiltered collection.
    pub fn new(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = start.map(parse_day_start).transpose()?;
        let end = end.map(parse_day_end).transpose()?;
        Ok(Self { start, end })
    }

    /// Returns `true` if either bound is set.
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Returns `true` if the timestamp falls inside the range.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        if self.start.is_some_and(|start| ts < start) {
            return false;
        }
        if self.end.is_some_and(|end| ts > end) {
            return false;
        }
        true
    }
}

fn parse_day_start(date_str: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| ChatsiftError::invalid_date(date_str))?;
    Ok(naive.and_hms_opt(0, 0, 0).unwrap().and_utc())
}

fn parse_day_end(date_str: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| ChatsiftError::invalid_date(date_str))?;
    // End of the day to include the full day
    Ok(naive.and_hms_opt(23, 59, 59).unwrap().and_utc())
}

/// Returns a new collection with only the records inside the range.
///
/// The original collection is untouched; an inactive range clones the full
/// set.
pub fn filter_by_date(records: &[MessageRecord], range: &DateRange) -> Vec<MessageRecord> {
    if !range.is_active() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|rec| range.contains(rec.timestamp))
        .cloned()
        .collect()
}
