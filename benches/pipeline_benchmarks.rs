use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use fanweld::prelude::*;

const ITEMS: i64 = 2_000;

fn bench_pool_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out_fan_in");
    group.throughput(Throughput::Elements(ITEMS as u64));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    for workers in [1, 4, 20, 100].iter() {
        group.bench_with_input(
            BenchmarkId::new("workers", workers),
            workers,
            |b, &workers| {
                b.iter(|| {
                    rt.block_on(async {
                        let config = PipelineConfig::new()
                            .workers(workers)
                            .worker_delay(Duration::ZERO);
                        let report = Pipeline::with_source(SequenceSource::up_to(ITEMS), config)
                            .run_until(CancellationToken::new())
                            .await
                            .unwrap();
                        black_box(report.verify().unwrap());
                    })
                });
            },
        );
    }

    group.finish();
}

fn bench_merge_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_capacity");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    for capacity in [1, 20, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            capacity,
            |b, &capacity| {
                b.iter(|| {
                    rt.block_on(async {
                        let config = PipelineConfig::new()
                            .workers(20)
                            .worker_delay(Duration::ZERO)
                            .merge_capacity(capacity);
                        let report = Pipeline::with_source(SequenceSource::up_to(ITEMS), config)
                            .run_until(CancellationToken::new())
                            .await
                            .unwrap();
                        black_box(report.sink_sum);
                    })
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pool_sizes, bench_merge_capacity);
criterion_main!(benches);
