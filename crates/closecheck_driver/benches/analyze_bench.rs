//! Benchmark harness for the closecheck pipeline.
//!
//! Uses criterion for reliable benchmarking.
//! Run with: cargo bench -p closecheck_driver

use closecheck_driver::Program;
use closecheck_options::AnalysisOptions;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Small Go source for micro-benchmarks.
const SMALL_SOURCE: &str = r#"package main

import "os"

func main() {
	f, err := os.Open("input.txt")
	if err != nil {
		return
	}
	f.Close()
}
"#;

/// One function per resource pattern the analyzer distinguishes.
const FUNCTION_TEMPLATE: &str = r#"
func read_N(path string) error {
	f, err := os.Open(path)
	if err != nil {
		return err
	}
	buf := make([]byte, 64)
	n, err := f.Read(buf)
	_ = n
	f.Close()
	return err
}

func leak_N(path string) {
	f, _ := os.Open(path)
	_ = f
}

func query_N(db *sql.DB) {
	rows, err := db.Query("SELECT 1")
	if err != nil {
		return
	}
	for rows.Next() {
		var v int
		rows.Scan(&v)
	}
	rows.Close()
}
"#;

/// A package with `count` copies of the template.
fn generate_source(count: usize) -> String {
    let mut source = String::from("package bench\n\nimport (\n\t\"database/sql\"\n\t\"os\"\n)\n");
    for i in 0..count {
        source.push_str(&FUNCTION_TEMPLATE.replace("_N", &format!("_{}", i)));
    }
    source
}

fn analyze(sources: &[(String, String)]) -> usize {
    let mut program = Program::new(AnalysisOptions::default());
    for (name, text) in sources {
        program.add_source(name.clone(), text.clone());
    }
    program.analyze().diagnostics.len()
}

fn bench_small(c: &mut Criterion) {
    let sources = vec![("main.go".to_string(), SMALL_SOURCE.to_string())];
    c.bench_function("analyze_small", |b| b.iter(|| analyze(black_box(&sources))));
}

fn bench_file_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_file_size");
    for count in [10, 100, 500] {
        let sources = vec![("bench/bench.go".to_string(), generate_source(count))];
        group.bench_with_input(BenchmarkId::from_parameter(count), &sources, |b, sources| {
            b.iter(|| analyze(black_box(sources)))
        });
    }
    group.finish();
}

fn bench_directories(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_directories");
    for dirs in [1, 8, 32] {
        let sources: Vec<(String, String)> = (0..dirs)
            .map(|d| (format!("pkg{}/bench.go", d), generate_source(20)))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(dirs), &sources, |b, sources| {
            b.iter(|| analyze(black_box(sources)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_small, bench_file_size, bench_directories);
criterion_main!(benches);
