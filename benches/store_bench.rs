//! Benchmarks for blobfile store operations

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::TempDir;

use blobfile::{Config, SingleFileBlobStore};

/// Store without fsync so the benchmark measures the engine, not the disk
fn bench_store(path: &std::path::Path) -> SingleFileBlobStore {
    let config = Config::builder().path(path).sync_writes(false).build();
    SingleFileBlobStore::open(config).unwrap()
}

fn add_blob_benchmark(c: &mut Criterion) {
    let payload = vec![0x5Au8; 1024];

    c.bench_function("add_blob_1kib", |b| {
        b.iter_batched(
            || {
                let temp_dir = TempDir::new().unwrap();
                let store = bench_store(&temp_dir.path().join("bench.dat"));
                (temp_dir, store)
            },
            |(_temp, store)| {
                for i in 0..50 {
                    store.add_blob(&format!("key{}", i), &payload).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn get_blob_benchmark(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let store = bench_store(&temp_dir.path().join("bench.dat"));

    let payload = vec![0xA5u8; 1024];
    for i in 0..100 {
        store.add_blob(&format!("key{}", i), &payload).unwrap();
    }

    c.bench_function("get_blob_1kib", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let key = format!("key{}", i % 100);
            i += 1;
            let mut out = Vec::with_capacity(1024);
            assert!(store.get_blob(&key, &mut out).unwrap());
            out
        });
    });
}

criterion_group!(benches, add_blob_benchmark, get_blob_benchmark);
criterion_main!(benches);
