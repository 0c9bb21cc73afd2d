use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flakeid::{Generator, IdGenStatus, SystemClock, TimeSource};
use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicU64, Ordering},
    },
    thread::scope,
    time::Instant,
};

/// Advances one millisecond every 4096 reads so the sequence never exhausts
/// and the hot path is measured without spinning.
struct MockTime {
    reads: AtomicU64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        flakeid::DEFAULT_EPOCH + self.reads.fetch_add(1, Ordering::Relaxed) / 4096
    }
}

fn mock_generator() -> Generator<MockTime> {
    Generator::with_clock(
        1,
        1,
        MockTime {
            reads: AtomicU64::new(0),
        },
    )
    .expect("valid identifiers")
}

fn system_generator() -> Generator<SystemClock> {
    Generator::new(1, 1).expect("valid identifiers")
}

// Number of IDs generated per benchmark iteration (split across threads for
// contended runs).
const TOTAL_IDS: usize = 4096;

fn bench_sequential<T: TimeSource>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> Generator<T>,
) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let generator = generator_fn();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().expect("clock is sane"));
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

fn bench_poll<T: TimeSource>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> Generator<T>,
) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let generator = generator_fn();
                for _ in 0..TOTAL_IDS {
                    loop {
                        match generator.poll_id().expect("clock is sane") {
                            IdGenStatus::Ready { id } => {
                                black_box(id);
                                break;
                            }
                            IdGenStatus::Pending { .. } => core::hint::spin_loop(),
                        }
                    }
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

fn bench_contended<T: TimeSource + Clone + Send + Sync>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> Generator<T>,
) {
    let mut group = c.benchmark_group(group_name);
    let max_threads = num_cpus::get().max(1);

    for thread_count in [1, 2, 4, 8, 16].into_iter().filter(|n| *n <= max_threads) {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(
            format!("elems/{TOTAL_IDS}/threads/{thread_count}"),
            |b| {
                b.iter_custom(|iters| {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let generator = generator_fn();
                        let barrier = Arc::new(Barrier::new(thread_count + 1));
                        scope(|s| {
                            for _ in 0..thread_count {
                                let generator = generator.clone();
                                let barrier = Arc::clone(&barrier);
                                s.spawn(move || {
                                    barrier.wait();
                                    for _ in 0..ids_per_thread {
                                        black_box(generator.next_id().expect("clock is sane"));
                                    }
                                });
                            }
                            barrier.wait();
                        });
                    }

                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_mock_sequential(c: &mut Criterion) {
    bench_sequential(c, "mock/sequential/next_id", mock_generator);
}

fn benchmark_mock_poll(c: &mut Criterion) {
    bench_poll(c, "mock/sequential/poll_id", mock_generator);
}

fn benchmark_mock_contended(c: &mut Criterion) {
    bench_contended(c, "mock/contended/next_id", || {
        Generator::with_clock(
            1,
            1,
            Arc::new(MockTime {
                reads: AtomicU64::new(0),
            }),
        )
        .expect("valid identifiers")
    });
}

fn benchmark_system_sequential(c: &mut Criterion) {
    bench_sequential(c, "system/sequential/next_id", system_generator);
}

fn benchmark_system_contended(c: &mut Criterion) {
    bench_contended(c, "system/contended/next_id", system_generator);
}

criterion_group!(
    benches,
    // Mock clock
    benchmark_mock_sequential,
    benchmark_mock_poll,
    benchmark_mock_contended,
    // Wall clock (spins on exhausted milliseconds)
    benchmark_system_sequential,
    benchmark_system_contended,
);
criterion_main!(benches);
