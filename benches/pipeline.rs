//! Benchmarks for chatsift pipeline stages.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench pipeline -- rule_engine`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, TimeZone, Utc};

use chatsift::engine::{RuleEngine, SnipHistogram};
use chatsift::identity::IdentityMap;
use chatsift::record::MessageRecord;
use chatsift::reshape::{build_table, group_consecutive_rows};
use chatsift::settings::{AuthorFormat, BadWordMode, ExportSettings, UrlFormat};

// =============================================================================
// Test Data Generators
// =============================================================================

fn generate_records(count: usize) -> Vec<MessageRecord> {
    let base_time = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let (id, name) = if i % 3 == 0 { ("1", "Alice") } else { ("2", "Bob") };
            let content = match i % 4 {
                0 => format!("plain message number {i}"),
                1 => format!("see https://example.com/page/{i} for details"),
                2 => format!("  darn   spacing   in message {i}  "),
                _ => format!("{name}: prefixed message {i}"),
            };
            MessageRecord::new(id, name, base_time + Duration::minutes(i as i64), content)
        })
        .collect()
}

fn full_rule_settings() -> ExportSettings {
    ExportSettings::new()
        .with_author_format(AuthorFormat::Anonymize)
        .with_author_scrub(true)
        .with_url_shortening(UrlFormat::TagDomain)
        .with_bad_words(BadWordMode::SnipWord, ["darn", "heck"])
        .with_whitespace_normalization(true)
        .with_trim_chars(Some(3), Some(500))
}

// =============================================================================
// Rule Engine Benchmarks
// =============================================================================

fn bench_rule_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_engine");
    let settings = full_rule_settings();
    let engine = RuleEngine::new(&settings).unwrap();

    for size in [100_usize, 1_000, 10_000, 50_000] {
        let records = generate_records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &records,
            |b, records| {
                b.iter(|| {
                    let mut histogram = SnipHistogram::new();
                    for rec in records {
                        let outcome = engine.process(
                            black_box(rec.content()),
                            rec.author_name(),
                            rec.author_id(),
                        );
                        histogram.merge(&outcome.snipped);
                        black_box(outcome.content);
                    }
                    black_box(histogram)
                });
            },
        );
    }
    group.finish();
}

fn bench_engine_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_compile");

    for words in [10_usize, 100, 1_000] {
        let list: Vec<String> = (0..words).map(|i| format!("word{i}")).collect();
        let settings = ExportSettings::new().with_bad_words(BadWordMode::SnipWord, list);
        group.bench_with_input(
            BenchmarkId::from_parameter(words),
            &settings,
            |b, settings| {
                b.iter(|| {
                    let engine = RuleEngine::new(black_box(settings)).unwrap();
                    black_box(engine)
                });
            },
        );
    }
    group.finish();
}

// =============================================================================
// Reshaping Benchmarks
// =============================================================================

fn bench_build_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_table");
    let settings = ExportSettings::new().with_author_format(AuthorFormat::Anonymize);

    for size in [1_000_usize, 10_000, 100_000] {
        let records = generate_records(size);
        let identity = IdentityMap::build(
            records.iter().map(|r| r.author_id().to_string()),
            &settings,
        );
        let rows: Vec<(MessageRecord, String)> = records
            .iter()
            .map(|r| (r.clone(), r.content().unwrap_or_default().to_string()))
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| {
                let table = build_table(black_box(rows), &settings, &identity);
                black_box(table)
            });
        });
    }
    group.finish();
}

fn bench_group_consecutive(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_consecutive");
    let settings = ExportSettings::new();
    let identity = IdentityMap::build(std::iter::empty::<String>(), &settings);

    for size in [1_000_usize, 10_000, 100_000] {
        let records = generate_records(size);
        let rows: Vec<(MessageRecord, String)> = records
            .iter()
            .map(|r| (r.clone(), r.content().unwrap_or_default().to_string()))
            .collect();
        let table = build_table(&rows, &settings, &identity);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| {
                let mut table = table.clone();
                group_consecutive_rows(black_box(&mut table));
                black_box(table)
            });
        });
    }
    group.finish();
}

// =============================================================================
// End-to-End Pipeline Benchmark
// =============================================================================

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    let settings = full_rule_settings();

    for size in [1_000_usize, 10_000, 50_000] {
        let records = generate_records(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &records,
            |b, records| {
                b.iter(|| {
                    // Full pipeline minus the filesystem: rules -> identity -> table
                    let engine = RuleEngine::new(&settings).unwrap();
                    let identity = IdentityMap::build(
                        records.iter().map(|r| r.author_id().to_string()),
                        &settings,
                    );

                    let mut rewritten = Vec::with_capacity(records.len());
                    for rec in records {
                        let outcome =
                            engine.process(rec.content(), rec.author_name(), rec.author_id());
                        if let Some(content) = outcome.content {
                            rewritten.push((rec.clone(), content));
                        }
                    }

                    let mut table = build_table(&rewritten, &settings, &identity);
                    group_consecutive_rows(&mut table);
                    black_box(table)
                });
            },
        );
    }
    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_rule_engine,
    bench_engine_compile,
    bench_build_table,
    bench_group_consecutive,
    bench_full_pipeline,
);

criterion_main!(benches);
