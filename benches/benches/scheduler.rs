use std::{sync::Arc, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use criterion_cpu_time::PosixTime;
use pulz_tasksys::{SleepingThreadPool, TaskSystem};

type CpuCriterion = criterion::Criterion<PosixTime>;

fn configure_criterion() -> CpuCriterion {
    Criterion::default()
        .with_measurement(PosixTime::UserAndSystemTime)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3))
}

/// Measures wall-clock time to run `n` uniform-cost, embarrassingly
/// parallel tasks across a range of pool sizes, the scenario
/// `spec.md`'s P3 describes.
fn intra_group_speedup(c: &mut CpuCriterion) {
    const N: usize = 512;
    const TASK_COST: Duration = Duration::from_micros(200);

    let mut group = c.benchmark_group("intra_group_speedup");
    group.throughput(Throughput::Elements(N as u64));
    for &num_threads in &[1usize, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            &num_threads,
            |b, &num_threads| {
                let pool = SleepingThreadPool::new(num_threads);
                b.iter(|| {
                    pool.run(Arc::new(|_i: usize, _n: usize| {
                        std::thread::sleep(TASK_COST);
                    }), N);
                });
            },
        );
    }
    group.finish();
}

/// Measures overhead of submitting many small groups in a dependency
/// chain, as opposed to one big group.
fn dependency_chain_overhead(c: &mut CpuCriterion) {
    let mut group = c.benchmark_group("dependency_chain_overhead");
    for &chain_len in &[1usize, 8, 64] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chain_len),
            &chain_len,
            |b, &chain_len| {
                let pool = SleepingThreadPool::new(4);
                b.iter(|| {
                    let mut prev = None;
                    for _ in 0..chain_len {
                        let deps: Vec<_> = prev.into_iter().collect();
                        prev = Some(pool.run_async_with_deps(
                            Arc::new(|_i: usize, _n: usize| {}),
                            4,
                            &deps,
                        ));
                    }
                    pool.sync();
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    name = scheduler_benches;
    config = configure_criterion();
    targets = intra_group_speedup, dependency_chain_overhead
);
criterion_main!(scheduler_benches);
