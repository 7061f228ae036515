//! Performance benchmarks for batchcopy
//!
//! Run with: cargo bench

use batchcopy::core::{
    BatchResult, CancelSignal, OpContext, Operation, PoolConfig, Transport, WorkerPool,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a test file of the specified size
fn create_test_file(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();

    let chunk_size = 64 * 1024;
    let chunk: Vec<u8> = (0..chunk_size).map(|i| (i % 256) as u8).collect();
    let mut remaining = size;

    while remaining > 0 {
        let to_write = remaining.min(chunk_size);
        file.write_all(&chunk[..to_write]).unwrap();
        remaining -= to_write;
    }

    path
}

fn batch(src: &Path, dst: &Path, count: usize) -> Vec<Operation> {
    (0..count)
        .map(|i| {
            let name = format!("file_{}.txt", i);
            Operation::local(src.join(&name), dst.join(&name), OpContext::new("bench", i + 1))
        })
        .collect()
}

fn bench_small_file_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_100_small_files");

    let src_dir = TempDir::new().unwrap();
    let dst_dir = TempDir::new().unwrap();
    for i in 0..100 {
        create_test_file(src_dir.path(), &format!("file_{}.txt", i), 1024);
    }

    for workers in [1, 4, 8] {
        let pool = WorkerPool::new(PoolConfig {
            workers,
            ..Default::default()
        });

        group.bench_with_input(BenchmarkId::new("workers", workers), &workers, |b, _| {
            b.iter(|| {
                let ops = batch(src_dir.path(), dst_dir.path(), 100);
                let summary = pool
                    .run(ops, &CancelSignal::never(), &mut |_: &BatchResult| {})
                    .unwrap();
                black_box(summary);
            });
        });
    }

    group.finish();
}

fn bench_large_file_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_file_copy");
    let transport = Transport::default();

    for size in [1024 * 1024, 10 * 1024 * 1024, 100 * 1024 * 1024] {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();

        let src_file = create_test_file(src_dir.path(), "large.bin", size);
        let dst_file = dst_dir.path().join("large.bin");

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("streamed", humansize::format_size(size as u64, humansize::BINARY)),
            &size,
            |b, _| {
                b.iter(|| {
                    let mut op = Operation::local(&src_file, &dst_file, OpContext::new("bench", 1));
                    let _ = black_box(op.copy(&transport, None));
                    let _ = std::fs::remove_file(&dst_file);
                });
            },
        );
    }

    group.finish();
}

fn bench_list_parsing(c: &mut Criterion) {
    let list: String = (0..10_000)
        .map(|i| match i % 4 {
            0 => "# comment\n".to_string(),
            1 => format!("https://example.com/pub/file_{}.bin\n", i),
            _ => format!("dir_{}/file_{}.txt\n", i % 50, i),
        })
        .collect();

    c.bench_function("parse_10000_lines", |b| {
        b.iter(|| {
            let ops = batchcopy::list::parse_list(
                list.as_bytes(),
                "bench",
                Path::new("/src"),
                Path::new("/dst"),
            )
            .unwrap();
            black_box(ops)
        });
    });
}

criterion_group!(
    benches,
    bench_small_file_batch,
    bench_large_file_copy,
    bench_list_parsing
);

criterion_main!(benches);
