//! # chatsift CLI
//!
//! Command-line interface for the chatsift library.

use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatsift::analytics::run_report;
use chatsift::cli::Args;
use chatsift::export::export;
use chatsift::filter::{DateRange, filter_by_date};
use chatsift::loader::load_csv;
use chatsift::progress::stderr_progress;
use chatsift::ChatsiftError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ChatsiftError> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();

    println!("🧹 chatsift v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.input);
    if args.report.is_none() {
        println!("💾 Output:  {}", args.output);
        println!("📄 Format:  {}", args.format);
    }

    // Step 1: Load
    println!("⏳ Loading CSV...");
    let load_start = Instant::now();
    let loaded = load_csv(Path::new(&args.input))?;
    println!(
        "   Found {} messages from {} authors ({:.2}s)",
        loaded.summary.total_messages,
        loaded.summary.total_authors,
        load_start.elapsed().as_secs_f64()
    );

    // Step 2: Date filter (BEFORE any content rule runs)
    let range = DateRange::new(args.after.as_deref(), args.before.as_deref())?;
    let records = if range.is_active() {
        if let Some(ref after) = args.after {
            println!("📅 After:   {}", after);
        }
        if let Some(ref before) = args.before {
            println!("📅 Before:  {}", before);
        }
        let filtered = filter_by_date(&loaded.records, &range);
        println!("   {} messages in range", filtered.len());
        filtered
    } else {
        loaded.records
    };

    // Step 3: Settings; the relative date modes anchor on the unfiltered
    // bounds of the whole file.
    let mut settings = args.to_settings()?;
    if let Some(bounds) = loaded.summary.date_bounds {
        settings = settings.with_date_bounds(bounds);
    }

    println!();

    // Step 4: Report or export
    if let Some(kind) = args.report {
        let text = run_report(kind, &records, &loaded.summary.authors, &settings)?;
        println!("{}", text);
        return Ok(());
    }

    let report = export(
        &records,
        &settings,
        args.format,
        Path::new(&args.output),
        &stderr_progress(),
    )?;

    println!();
    println!("✅ Done! Output saved to {}", report.output_path.display());
    if let Some(ref key_file) = report.key_file {
        println!("🔑 Key file: {}", key_file.display());
    }
    if let Some(ref reason) = report.compression_error {
        println!("⚠️  Compression failed ({reason}); kept the uncompressed file.");
    }

    println!();
    println!("📊 Summary:");
    println!("   Loaded:    {} messages", loaded.summary.total_messages);
    println!("   Written:   {} rows", report.rows_written);
    println!("   Size:      {}", report.human_size());
    if !report.snipped_words.is_empty() {
        println!("   Snipped:   {} words", report.snipped_words.total());
    }

    println!();
    println!("⚡ Total time: {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}
