//! Integration tests: full pipeline from a CSV on disk to an artifact on disk.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use chatsift::prelude::*;
use chatsift::settings::{AttachmentFormat, AuthorFormat, BadWordMode, DateFormat, TrimLogic};

/// Writes a small chat log fixture and returns its directory and path.
fn fixture() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("chat.csv");
    let csv = "\
AuthorID,Author,Date,Content,Attachments,Reactions
11,Alice,2024-01-15 10:30:00,Hello everyone!,,
22,Bob,2024-01-15 10:31:00,check https://example.com/page now,,👍 (2)
11,Alice,2024-01-15 10:32:00,darn that is neat,https://cdn.example.com/img.png?size=big,
11,Alice,2024-01-16 09:00:00,ok,,
";
    fs::write(&path, csv).expect("write fixture");
    (dir, path)
}

#[test]
fn test_load_summary() {
    let (_dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();

    assert_eq!(loaded.records.len(), 4);
    assert_eq!(loaded.summary.total_messages, 4);
    assert_eq!(loaded.summary.total_authors, 2);
    assert_eq!(loaded.summary.authors[0].name, "Alice");
    assert_eq!(loaded.summary.authors[0].count, 3);

    let bounds = loaded.summary.date_bounds.unwrap();
    assert!(bounds.first < bounds.last);
}

#[test]
fn test_default_export_round_trip() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("out.csv");

    let report = export(
        &loaded.records,
        &ExportSettings::new(),
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();

    assert_eq!(report.rows_written, 4);
    assert_eq!(report.output_path, dest);
    assert!(report.key_file.is_none());

    let bytes = fs::read(&dest).unwrap();
    assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert!(text.starts_with("AuthorID,Author,Date,Content,Attachments,Reactions"));
    assert!(text.contains("Hello everyone!"));
    assert!(text.contains("👍 (2)"));
}

#[test]
fn test_anonymize_with_key_file() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("anon.csv");

    let settings = ExportSettings::new()
        .with_author_format(AuthorFormat::Anonymize)
        .with_key_file(true);
    let report = export(
        &loaded.records,
        &settings,
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();

    let text = fs::read_to_string(&dest).unwrap();
    assert!(text.contains("User1"));
    assert!(text.contains("User2"));
    assert!(!text.contains("Alice"));
    assert!(!text.contains("Bob"));

    let key_path = report.key_file.expect("key file written");
    assert_eq!(key_path, dir.path().join("export_key.txt"));
    let key = fs::read_to_string(&key_path).unwrap();
    assert!(key.starts_with("Export Key\n===================\n"));
    assert!(key.contains("User1: Alice (11)"));
    assert!(key.contains("User2: Bob (22)"));
}

#[test]
fn test_numeric_keys_header() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("keys.csv");

    let settings = ExportSettings::new().with_author_format(AuthorFormat::NumericKeys);
    export(
        &loaded.records,
        &settings,
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();

    let text = fs::read_to_string(&dest).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.contains("AuthorKey"));
    assert!(!header.contains("AuthorID"));
}

#[test]
fn test_date_filter_then_export() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();

    let range = DateRange::new(Some("2024-01-16"), None).unwrap();
    let in_range = filter_by_date(&loaded.records, &range);
    assert_eq!(in_range.len(), 1);

    let dest = dir.path().join("filtered.csv");
    let report = export(
        &in_range,
        &ExportSettings::new(),
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();
    assert_eq!(report.rows_written, 1);
}

#[test]
fn test_bad_word_snipping_end_to_end() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("snipped.csv");

    let settings = ExportSettings::new().with_bad_words(BadWordMode::SnipWord, ["darn"]);
    let report = export(
        &loaded.records,
        &settings,
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();

    assert_eq!(report.snipped_words.total(), 1);
    let text = fs::read_to_string(&dest).unwrap();
    assert!(text.contains("<snip> that is neat"));
    assert!(!text.contains("darn"));
}

#[test]
fn test_url_shortening_end_to_end() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("urls.csv");

    let settings =
        ExportSettings::new().with_url_shortening(chatsift::settings::UrlFormat::TagGeneric);
    export(
        &loaded.records,
        &settings,
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();

    let text = fs::read_to_string(&dest).unwrap();
    assert!(text.contains("check <link> now"));
    assert!(!text.contains("https://example.com/page"));
}

#[test]
fn test_trim_drops_rows() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("trimmed.csv");

    // "ok" has 2 chars and 1 word; the OR combinator drops it either way.
    let settings = ExportSettings::new()
        .with_trim_logic(TrimLogic::Or)
        .with_trim_chars(Some(3), None)
        .with_trim_words(Some(2), None);
    let report = export(
        &loaded.records,
        &settings,
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();

    assert_eq!(report.rows_written, 3);
    let text = fs::read_to_string(&dest).unwrap();
    assert!(!text.contains(",ok,"));
}

#[test]
fn test_txt_format_fixed_width() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("out.txt");

    let settings = ExportSettings::new()
        .with_date_format(DateFormat::Hide)
        .with_attachments(false, AttachmentFormat::Link)
        .with_reactions(false);
    export(
        &loaded.records,
        &settings,
        ExportFormat::Txt,
        &dest,
        &no_progress(),
    )
    .unwrap();

    let text = fs::read_to_string(&dest).unwrap();
    let widths: Vec<usize> = text.lines().map(|l| l.chars().count()).collect();
    assert_eq!(widths.len(), 5);
    assert!(widths.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_grouping_blanks_consecutive_authors() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("grouped.csv");

    let settings = ExportSettings::new().with_grouping(true);
    export(
        &loaded.records,
        &settings,
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();

    let text = fs::read_to_string(&dest).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // Bob breaks Alice's run, so row 3 keeps its author cells and only the
    // repeat in row 4 is blanked.
    assert!(lines[3].starts_with("11,Alice,"));
    assert!(lines[4].starts_with(",,"));
}

#[test]
fn test_attachment_filename_rendering() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("att.csv");

    let settings = ExportSettings::new().with_attachments(true, AttachmentFormat::Filename);
    export(
        &loaded.records,
        &settings,
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();

    let text = fs::read_to_string(&dest).unwrap();
    assert!(text.contains("img.png"));
    assert!(!text.contains("size=big"));
}

#[test]
fn test_compression_replaces_artifact() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("out.csv");

    let settings = ExportSettings::new().with_compression(true);
    let report = export(
        &loaded.records,
        &settings,
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();

    assert!(report.compression_error.is_none());
    assert_eq!(report.output_path, dir.path().join("out.zip"));
    assert!(report.output_path.exists());
    assert!(!dest.exists());
}

#[test]
fn test_content_report_matches_export() {
    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();

    let settings = ExportSettings::new()
        .with_bad_words(BadWordMode::SnipWord, ["darn"])
        .with_trim_chars(Some(3), None);
    let text = run_report(
        ReportKind::Content,
        &loaded.records,
        &loaded.summary.authors,
        &settings,
    )
    .unwrap();
    assert!(text.contains("Messages that would be REMOVED by trimming: 1"));
    assert!(text.contains("Total words that would be SNIPPED: 1"));

    let dest = dir.path().join("confirm.csv");
    let report = export(
        &loaded.records,
        &settings,
        ExportFormat::Csv,
        &dest,
        &no_progress(),
    )
    .unwrap();
    assert_eq!(report.rows_written, 3);
    assert_eq!(report.snipped_words.total(), 1);
}

#[test]
fn test_missing_column_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "Author,Date,Content\nAlice,2024-01-15 10:30:00,hi\n").unwrap();

    let err = load_csv(&path).unwrap_err();
    assert!(matches!(
        err,
        ChatsiftError::MissingColumn { column: "AuthorID", .. }
    ));
}

#[test]
fn test_progress_reaches_completion() {
    use std::sync::{Arc, Mutex};

    let (dir, path) = fixture();
    let loaded = load_csv(&path).unwrap();
    let dest = dir.path().join("progress.csv");

    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress: ProgressFn = Arc::new(move |update: &ProgressUpdate| {
        sink.lock().unwrap().push(update.percent);
    });

    export(
        &loaded.records,
        &ExportSettings::new(),
        ExportFormat::Csv,
        &dest,
        &progress,
    )
    .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen.first().unwrap(), 5);
    assert_eq!(*seen.last().unwrap(), 100);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}
