use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hashtag_graph::stream::{average_degree_by_partition, Record};
use hashtag_graph::{AppConfig, DegreeStream, EvictionPolicy, HashtagSet, WindowedTagGraph};
use hashtag_graph::config::WindowConfig;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 10, 29, 17, 51, 1).unwrap()
}

/// Deterministic synthetic stream: one post per second, 0..=4 tags drawn from a
/// vocabulary of `vocabulary` hashtags
fn synthetic_records(count: usize, vocabulary: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let tag_count = i % 5;
            let tags: HashtagSet = (0..tag_count)
                .map(|j| format!("#tag{}", (i * 7 + j * 13) % vocabulary))
                .collect();
            Record::new(tags, start() + Duration::seconds(i as i64))
        })
        .collect()
}

/// Benchmark ingest throughput for different vocabulary sizes
fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    group.significance_level(0.1).sample_size(10);

    for vocabulary in [50, 500, 5_000].iter() {
        let records = synthetic_records(10_000, *vocabulary);
        group.bench_with_input(BenchmarkId::new("vocabulary", vocabulary), &records, |b, records| {
            b.iter(|| {
                let mut graph = WindowedTagGraph::new();
                for record in records {
                    black_box(graph.ingest(&record.hashtags, record.created_at));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark the three eviction policies on the same stream
fn bench_eviction_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction_policy");
    group.significance_level(0.1).sample_size(10);
    let records = synthetic_records(10_000, 500);

    for policy in [EvictionPolicy::Truncated, EvictionPolicy::Watermark, EvictionPolicy::SecondsComponent] {
        group.bench_with_input(BenchmarkId::new("policy", format!("{:?}", policy)), &records, |b, records| {
            b.iter(|| {
                let mut graph = WindowedTagGraph::with_window(60, policy);
                for record in records {
                    black_box(graph.ingest(&record.hashtags, record.created_at));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark the full line pipeline, JSON decoding included
fn bench_line_pipeline(c: &mut Criterion) {
    let lines: Vec<String> = synthetic_records(5_000, 500)
        .iter()
        .map(|record| {
            let text: Vec<&str> = record.hashtags.iter().map(String::as_str).collect();
            serde_json::json!({
                "created_at": record.created_at.format("%a %b %d %H:%M:%S %z %Y").to_string(),
                "text": format!("synthetic post {}", text.join(" ")),
            })
            .to_string()
        })
        .collect();

    c.bench_function("line_pipeline_5000", |b| {
        b.iter(|| {
            let mut stream = DegreeStream::new(&AppConfig::default()).unwrap();
            for line in &lines {
                black_box(stream.process_line(line));
            }
        });
    });
}

/// Benchmark parallel partitions against one sequential graph
fn bench_partitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("partitions");
    group.significance_level(0.1).sample_size(10);
    let config = WindowConfig::default();

    for partition_count in [1, 4, 16].iter() {
        let partitions: Vec<Vec<Record>> = (0..*partition_count)
            .map(|_| synthetic_records(10_000 / partition_count, 500))
            .collect();
        group.bench_with_input(BenchmarkId::new("count", partition_count), &partitions, |b, partitions| {
            b.iter(|| black_box(average_degree_by_partition(partitions, &config)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ingest,
    bench_eviction_policies,
    bench_line_pipeline,
    bench_partitions
);

criterion_main!(benches);
