//! Throughput Benchmark for DistKV
//!
//! Measures the performance of the storage engine under various workloads.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use distkv::storage::StorageEngine;
use std::sync::Arc;

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let engine = Arc::new(StorageEngine::new());

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            engine.set(key, Bytes::from("small_value"));
            i += 1;
        });
    });

    group.bench_function("set_medium", |b| {
        let mut i = 0u64;
        let value = Bytes::from("x".repeat(1024)); // 1KB value
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            engine.set(key, value.clone());
            i += 1;
        });
    });

    group.bench_function("set_large", |b| {
        let mut i = 0u64;
        let value = Bytes::from("x".repeat(64 * 1024)); // 64KB value
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            engine.set(key, value.clone());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let engine = Arc::new(StorageEngine::new());

    // Pre-populate with data
    for i in 0..100_000 {
        let key = Bytes::from(format!("key:{}", i));
        let value = Bytes::from(format!("value:{}", i));
        engine.set(key, value);
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_hit", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i % 100_000));
            black_box(engine.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_miss", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("missing:{}", i));
            black_box(engine.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark list push/pop at both ends
fn bench_list_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");
    group.throughput(Throughput::Elements(1));

    group.bench_function("rpush", |b| {
        let engine = StorageEngine::new();
        b.iter(|| {
            engine
                .rpush(Bytes::from("queue"), Bytes::from("item"))
                .unwrap();
        });
    });

    group.bench_function("lpush_lpop", |b| {
        let engine = StorageEngine::new();
        b.iter(|| {
            engine
                .lpush(Bytes::from("stack"), Bytes::from("item"))
                .unwrap();
            black_box(engine.lpop(&Bytes::from("stack")));
        });
    });

    group.finish();
}

/// Benchmark set membership operations
fn bench_set_ops(c: &mut Criterion) {
    let engine = StorageEngine::new();
    for i in 0..10_000 {
        engine
            .sadd(Bytes::from("members"), Bytes::from(format!("m:{}", i)))
            .unwrap();
    }

    let mut group = c.benchmark_group("sets");
    group.throughput(Throughput::Elements(1));

    group.bench_function("sadd_new", |b| {
        let mut i = 10_000u64;
        b.iter(|| {
            engine
                .sadd(Bytes::from("members"), Bytes::from(format!("m:{}", i)))
                .unwrap();
            i += 1;
        });
    });

    group.bench_function("sismember_hit", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let member = Bytes::from(format!("m:{}", i % 10_000));
            black_box(engine.sismember(&Bytes::from("members"), &member));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent mixed workload across threads
fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");
    group.sample_size(10);

    group.bench_function("mixed_8_threads", |b| {
        b.iter(|| {
            let engine = Arc::new(StorageEngine::new());
            let mut handles = vec![];

            for t in 0..8 {
                let engine = Arc::clone(&engine);
                handles.push(std::thread::spawn(move || {
                    for i in 0..1_000 {
                        let key = Bytes::from(format!("t{}:k{}", t, i));
                        engine.set(key.clone(), Bytes::from("value"));
                        black_box(engine.get(&key));
                    }
                }));
            }

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_list_ops,
    bench_set_ops,
    bench_concurrent
);
criterion_main!(benches);
