//! Export benchmark suite.
//!
//! Benchmarks board assembly and both renderers at different board sizes:
//! - Columns: 4
//! - Messages: 100, 1000, 10000
//!
//! Run with: cargo bench --bench pivot
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Map, Value, json};

use retro_harvest::export::{csv::render_csv, legacy::render_legacy};
use retro_harvest::{BoardColumn, BoardInformation, FrameSchema, Message, board::assemble};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const COLUMN_COUNT: u32 = 4;
const MESSAGE_COUNTS: &[usize] = &[100, 1_000, 10_000];

// ============================================================================
// Fixtures
// ============================================================================

fn board(messages: usize) -> BoardInformation {
    let mut columns: Vec<BoardColumn> = (0..COLUMN_COUNT)
        .map(|id| BoardColumn::new(id, format!("Column {id}"), Vec::new()))
        .collect();

    let messages: Vec<Message> = (0..messages)
        .map(|i| {
            let id = format!("m{i}");
            columns[i % COLUMN_COUNT as usize].message_ids.push(id.clone());
            Message::new(id, format!("Message, \"number\" {i}"), (i % 7) as u64)
        })
        .collect();

    BoardInformation {
        board_name: Some("Benchmark Board".into()),
        columns,
        messages,
    }
}

fn payloads(messages: usize) -> Vec<Value> {
    let wrap = |path: &str, data: Value| json!({"t": "d", "d": {"b": {"p": path, "d": data}}});

    let mut columns = Map::new();
    let mut bodies = Map::new();
    let mut ids: Vec<Vec<String>> = vec![Vec::new(); COLUMN_COUNT as usize];

    for i in 0..messages {
        let id = format!("m{i}");
        ids[i % COLUMN_COUNT as usize].push(id.clone());
        bodies.insert(id, json!({"text": format!("Message {i}"), "votes": {"a": 1, "b": 2}}));
    }

    let mut titles = Map::new();
    for (column, ids) in ids.into_iter().enumerate() {
        titles.insert(column.to_string(), json!({"value": format!("Column {column}")}));
        columns.insert(column.to_string(), json!({"messagesIds": ids}));
    }

    vec![
        wrap("publicboards/b", json!({"boardName": "Benchmark Board", "columns": titles})),
        wrap("columns/publicboards/b", Value::Object(columns)),
        wrap("messages/b", Value::Object(bodies)),
    ]
}

// ============================================================================
// Benchmark: Assembly
// ============================================================================

fn bench_assemble(c: &mut Criterion) {
    let schema = FrameSchema::default();
    let mut group = c.benchmark_group("assemble");

    for &count in MESSAGE_COUNTS {
        let frames = payloads(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &frames, |b, frames| {
            b.iter(|| assemble(black_box(frames), &schema));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Renderers
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for &count in MESSAGE_COUNTS {
        let board = board(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("csv", count), &board, |b, board| {
            b.iter(|| render_csv(black_box(board)));
        });

        group.bench_with_input(BenchmarkId::new("legacy", count), &board, |b, board| {
            b.iter(|| render_legacy(black_box(board)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_assemble, bench_render);
criterion_main!(benches);
