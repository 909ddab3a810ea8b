//! Criterion benchmarks for π, ln 2 and the exponential.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use bigmath_core::{ln2_with, BigFloat, Execution, PiAlgorithm, Uncached, DEFAULT_BBP_THREADS};

fn bench_pi(c: &mut Criterion) {
    let precisions: Vec<i64> = vec![256, 1_024, 4_096];
    for algorithm in [PiAlgorithm::GaussLegendre, PiAlgorithm::Borwein, PiAlgorithm::Bbp] {
        for execution in [Execution::Sequential, Execution::Threaded] {
            let mut group = c.benchmark_group(format!("pi/{}/{execution:?}", algorithm.name()));
            for &precision in &precisions {
                group.bench_with_input(
                    BenchmarkId::from_parameter(precision),
                    &precision,
                    |b, &precision| {
                        b.iter(|| {
                            algorithm
                                .compute(precision, execution, DEFAULT_BBP_THREADS)
                                .unwrap()
                        });
                    },
                );
            }
            group.finish();
        }
    }
}

fn bench_ln2(c: &mut Criterion) {
    let mut group = c.benchmark_group("ln2");
    for precision in [256i64, 1_024, 4_096] {
        group.bench_with_input(
            BenchmarkId::from_parameter(precision),
            &precision,
            |b, &precision| {
                b.iter(|| ln2_with(precision, Execution::Sequential, &Uncached).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_exp(c: &mut Criterion) {
    let x = BigFloat::new(0x1_6a09_e667_i64, 32);
    for execution in [Execution::Sequential, Execution::Threaded] {
        let mut group = c.benchmark_group(format!("exp/{execution:?}"));
        for precision in [128i64, 512, 2_048] {
            group.bench_with_input(
                BenchmarkId::from_parameter(precision),
                &precision,
                |b, &precision| {
                    b.iter(|| x.exp(precision, execution, &Uncached).unwrap());
                },
            );
        }
        group.finish();
    }
}

criterion_group!(benches, bench_pi, bench_ln2, bench_exp);
criterion_main!(benches);
