use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::prelude::*;
use workpool::Pool;

/// Small CPU-bound payload so the benchmark measures dispatch, not work.
fn checksum(mut n: u64) -> u64 {
    let mut acc = 0u64;
    while n != 0 {
        acc = acc.wrapping_mul(31).wrapping_add(n);
        n /= 3;
    }
    acc
}

fn workload() -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..100).map(|_| rng.gen_range(1..1_000_000)).collect()
}

fn submit_wait_bench(c: &mut Criterion) {
    let inputs = workload();
    let mut group = c.benchmark_group("submit_wait");

    for threads in [1, 2, 4] {
        group.bench_with_input(
            BenchmarkId::new("workpool", threads),
            &threads,
            |b, &threads| {
                b.iter_batched(
                    || Pool::with_threads(threads),
                    |pool| {
                        let total = Arc::new(AtomicU64::new(0));
                        for &n in &inputs {
                            let total = Arc::clone(&total);
                            pool.submit_task(move || {
                                total.fetch_add(checksum(n), Ordering::Relaxed);
                            })
                            .unwrap();
                        }
                        pool.wait_for_all_jobs();
                    },
                    BatchSize::SmallInput,
                );
            },
        );

        group.bench_with_input(
            BenchmarkId::new("rayon", threads),
            &threads,
            |b, &threads| {
                b.iter_batched(
                    || {
                        rayon::ThreadPoolBuilder::new()
                            .num_threads(threads)
                            .build()
                            .unwrap()
                    },
                    |pool| {
                        let total = Arc::new(AtomicU64::new(0));
                        pool.scope(|s| {
                            for &n in &inputs {
                                let total = Arc::clone(&total);
                                s.spawn(move |_| {
                                    total.fetch_add(checksum(n), Ordering::Relaxed);
                                });
                            }
                        });
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn contract_bench(c: &mut Criterion) {
    let inputs = workload();
    let mut group = c.benchmark_group("contract");

    for threads in [1, 4] {
        group.bench_with_input(
            BenchmarkId::new("submit_get", threads),
            &threads,
            |b, &threads| {
                b.iter_batched(
                    || Pool::with_threads(threads),
                    |pool| {
                        let contracts: Vec<_> = inputs
                            .iter()
                            .map(|&n| pool.submit_contract(move || checksum(n)).unwrap())
                            .collect();
                        for contract in contracts {
                            contract.get().unwrap();
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, submit_wait_bench, contract_bench);
criterion_main!(benches);
