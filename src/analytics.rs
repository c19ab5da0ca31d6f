//! Read-only aggregate reports over the current record set.
//!
//! Each report is pure text generation from one pass over the records with
//! the current settings; nothing is mutated and no state is shared between
//! report calls. The content report runs the same rule engine as the export
//! pipeline in dry-run mode, so its numbers predict exactly what an export
//! with the same settings would do.
//!
//! Reports are selected through the [`ReportKind`] enum rather than any
//! presentation concept; [`run_report`] is the single dispatch point.
//!
//! # Example
//!
//! ```rust
//! use chatsift::analytics::{ReportKind, run_report};
//! use chatsift::settings::ExportSettings;
//!
//! # fn main() -> chatsift::Result<()> {
//! let records = vec![];
//! let roster = vec![];
//! let settings = ExportSettings::new();
//! let text = run_report(ReportKind::Temporal, &records, &roster, &settings)?;
//! assert!(text.contains("No data to analyze."));
//! # Ok(())
//! # }
//! ```

use chrono::{Datelike, Timelike, Weekday};

use crate::engine::{RuleEngine, SnipHistogram};
use crate::error::Result;
use crate::loader::AuthorStat;
use crate::record::MessageRecord;
use crate::settings::ExportSettings;

/// The available aggregate reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReportKind {
    /// Message counts and percentages for the selected authors.
    Authors,

    /// Message counts bucketed by weekday and hour of day.
    Temporal,

    /// Dry run of the content rules: drops, characters saved, snipped words.
    Content,

    /// Attachment and reaction counts plus exclusion flags.
    Attachments,
}

/// Runs one report over the current record set.
pub fn run_report(
    kind: ReportKind,
    records: &[MessageRecord],
    roster: &[AuthorStat],
    settings: &ExportSettings,
) -> Result<String> {
    match kind {
        ReportKind::Authors => author_summary(records, roster, settings),
        ReportKind::Temporal => Ok(temporal_summary(records)),
        ReportKind::Content => content_summary(records, settings),
        ReportKind::Attachments => Ok(attachment_summary(records, settings)),
    }
}

fn header(title: &str) -> String {
    format!("{}\n{}\n", title.to_uppercase(), "=".repeat(35))
}

fn fmt_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Selection summary: message share of the selected authors, top 5 by count,
/// and the character count the author scrub would remove.
pub fn author_summary(
    records: &[MessageRecord],
    roster: &[AuthorStat],
    settings: &ExportSettings,
) -> Result<String> {
    if records.is_empty() {
        return Ok("No data to analyze.".to_string());
    }

    let selected_stats: Vec<&AuthorStat> = roster
        .iter()
        .filter(|a| settings.is_author_selected(&a.id))
        .collect();

    let mut scrubbed_chars = 0usize;
    if settings.scrub_author_from_content {
        let engine = RuleEngine::new(settings)?;
        for rec in records {
            if !settings.is_author_selected(rec.author_id()) {
                continue;
            }
            if let Some(content) = rec.content() {
                let original_len = content.chars().count();
                let scrubbed = engine.scrub(content, rec.author_name(), rec.author_id());
                scrubbed_chars += original_len - scrubbed.chars().count();
            }
        }
    }

    let total_messages = records
        .iter()
        .filter(|rec| settings.is_author_selected(rec.author_id()))
        .count();

    let mut summary = header(&format!(
        "Author Analytics ({}/{} Selected)",
        selected_stats.len(),
        roster.len()
    ));
    summary.push_str(&format!(
        "Messages from selection: {}\n",
        fmt_count(total_messages as u64)
    ));
    if scrubbed_chars > 0 {
        summary.push_str(&format!(
            "Characters scrubbed from content: {}\n",
            fmt_count(scrubbed_chars as u64)
        ));
    }

    summary.push_str("\nTop 5 Selected Authors by Message Count:\n");
    let mut ranked = selected_stats;
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    for (i, author) in ranked.iter().take(5).enumerate() {
        let percentage = if total_messages > 0 {
            (author.count as f64 / total_messages as f64) * 100.0
        } else {
            0.0
        };
        summary.push_str(&format!(
            "  {}. {} ({}, {:.1}%)\n",
            i + 1,
            author.name,
            fmt_count(author.count as u64),
            percentage
        ));
    }
    Ok(summary)
}

/// Temporal summary: weekday and hour-of-day message buckets.
pub fn temporal_summary(records: &[MessageRecord]) -> String {
    if records.is_empty() {
        return "No data to analyze.".to_string();
    }

    let mut day_counts = [0u64; 7];
    let mut hour_counts = [0u64; 24];
    for rec in records {
        day_counts[rec.timestamp.weekday().num_days_from_monday() as usize] += 1;
        hour_counts[rec.timestamp.hour() as usize] += 1;
    }

    let mut summary = header(&format!(
        "Date & Time Summary ({} Messages)",
        fmt_count(records.len() as u64)
    ));
    summary.push_str("Messages by Day of the Week:\n");
    let days = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    for day in days {
        summary.push_str(&format!(
            "  - {:<9}: {}\n",
            day_name(day),
            fmt_count(day_counts[day.num_days_from_monday() as usize])
        ));
    }

    summary.push_str("\nMessages by Hour of the Day (UTC):\n");
    for (hour, &count) in hour_counts.iter().enumerate() {
        if count > 0 {
            summary.push_str(&format!("  - Hour {hour:02}: {}\n", fmt_count(count)));
        }
    }
    summary
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Content dry run: how many messages the current rules would drop, the
/// characters saved, and the top snipped words.
pub fn content_summary(records: &[MessageRecord], settings: &ExportSettings) -> Result<String> {
    if records.is_empty() {
        return Ok("No data to analyze.".to_string());
    }

    let engine = RuleEngine::new(settings)?;
    let mut original_chars = 0usize;
    let mut processed_chars = 0usize;
    let mut removed_messages = 0usize;
    let mut histogram = SnipHistogram::new();

    for rec in records {
        let original_len = rec.content().map_or(0, |c| c.chars().count());
        original_chars += original_len;

        let outcome = engine.process(rec.content(), rec.author_name(), rec.author_id());
        histogram.merge(&outcome.snipped);
        match outcome.content {
            Some(content) => processed_chars += content.chars().count(),
            None => removed_messages += 1,
        }
    }

    let mut summary = header("Content Analytics Dry Run");
    summary.push_str(&format!(
        "Messages that would be REMOVED by trimming: {}\n",
        fmt_count(removed_messages as u64)
    ));
    summary.push_str(&format!(
        "Characters SAVED/REMOVED by all operations: {}\n\n",
        fmt_count(original_chars.saturating_sub(processed_chars) as u64)
    ));

    if !histogram.is_empty() {
        summary.push_str(&format!(
            "Total words that would be SNIPPED: {}\n",
            fmt_count(histogram.total())
        ));
        summary.push_str("Top 5 Snipped Words (from the word list):\n");
        for (i, (word, count)) in histogram.top(5).iter().enumerate() {
            summary.push_str(&format!(
                "  {}. '{}' ({} times)\n",
                i + 1,
                word,
                fmt_count(*count)
            ));
        }
    }
    Ok(summary)
}

/// Attachment/reaction summary: counts and whether they'd be excluded.
pub fn attachment_summary(records: &[MessageRecord], settings: &ExportSettings) -> String {
    if records.is_empty() {
        return "No data to analyze.".to_string();
    }

    let with_attachments = records.iter().filter(|r| r.attachment().is_some()).count();
    let with_reactions = records.iter().filter(|r| r.reactions().is_some()).count();

    let mut summary = header("Attachment/Reaction Analytics");
    if settings.include_attachments {
        summary.push_str(&format!(
            "Messages with attachments: {}\n",
            fmt_count(with_attachments as u64)
        ));
    } else {
        summary.push_str(&format!(
            "Attachments will be excluded ({} msgs affected).\n",
            fmt_count(with_attachments as u64)
        ));
    }
    if settings.include_reactions {
        summary.push_str(&format!(
            "Messages with reactions: {}\n",
            fmt_count(with_reactions as u64)
        ));
    } else {
        summary.push_str(&format!(
            "Reactions will be excluded ({} msgs affected).\n",
            fmt_count(with_reactions as u64)
        ));
    }
    summary
}
