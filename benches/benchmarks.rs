//! Performance benchmarks for Walkbook.
//!
//! This module contains benchmarks for:
//! - Runbook compilation (parsing and table building)
//! - Prompt command normalization
//! - Payload embedding
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use walkbook::artifact::{embed, extract, Payload};
use walkbook::runbook::{build_runbook, compile_str, parse_runbook_str};
use walkbook::walkthrough::Action;

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    /// Generate a runbook with `steps` steps, each carrying a block
    /// description and a mix of command and snippet suggestions.
    pub fn generate_runbook(steps: usize) -> String {
        let mut doc = String::new();
        for i in 0..steps {
            doc.push_str(&format!("step: Step number {i}\n"));
            doc.push_str("desc: |\n Make sure the previous step finished.\n\n Then continue.\n");
            doc.push_str("suggestions:\n");
            doc.push_str(&format!("  - note: check state {i}\n    cmd: systemctl status app-{i}\n"));
            doc.push_str("  - kind: cmd\n    cmd: |\n       make build\n       make test\n");
            doc.push_str("  - kind: snippet\n    note: environment\n    content: |\n       export STAGE=prod\n");
            doc.push_str("---\n");
        }
        doc
    }
}

// ============================================================================
// Compiler Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("compiler");

    for steps in &[10usize, 100, 1000] {
        let doc = fixtures::generate_runbook(*steps);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", steps), &doc, |b, doc| {
            b.iter(|| parse_runbook_str(black_box(doc)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("compile", steps), &doc, |b, doc| {
            b.iter(|| compile_str(black_box(doc)).unwrap());
        });
    }

    group.finish();
}

fn bench_build_tables(c: &mut Criterion) {
    let records = parse_runbook_str(&fixtures::generate_runbook(1000)).unwrap();

    c.bench_function("build_runbook_1000_steps", |b| {
        b.iter(|| build_runbook(black_box(&records)).unwrap());
    });
}

// ============================================================================
// Runtime Benchmarks
// ============================================================================

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for input in ["ns", "12", "goto 3", ":snippet paste ~/out.txt overwrite", "git status --short"] {
        group.bench_with_input(BenchmarkId::new("action", input), input, |b, input| {
            b.iter(|| Action::normalize(black_box(input)));
        });
    }

    group.finish();
}

fn bench_payload(c: &mut Criterion) {
    let runbook = compile_str(&fixtures::generate_runbook(100)).unwrap();
    let payload = Payload::new("bench", runbook);
    let program = vec![0u8; 4 * 1024 * 1024];
    let embedded = embed(&program, &payload).unwrap();

    let mut group = c.benchmark_group("payload");
    group.bench_function("embed", |b| b.iter(|| embed(black_box(&program), black_box(&payload)).unwrap()));
    group.bench_function("extract", |b| b.iter(|| extract(black_box(&embedded)).unwrap()));
    group.finish();
}

// ============================================================================
// Criterion Groups and Main
// ============================================================================

criterion_group!(compiler_benches, bench_parse, bench_build_tables,);

criterion_group!(runtime_benches, bench_normalize, bench_payload,);

criterion_main!(compiler_benches, runtime_benches);
