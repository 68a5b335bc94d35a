use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cyclife::archive::synthetic::{generate, SyntheticConfig};
use cyclife::archive::ArchiveSource;
use cyclife::curve::{cycle_curve, resample, DEFAULT_POINTS};

/// Benchmark resampling a single series onto the default grid
fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");

    for len in [100usize, 1_000, 10_000] {
        let series: Vec<f64> = (0..len).map(|i| (i as f64 * 0.01).sin()).collect();
        group.throughput(Throughput::Elements(DEFAULT_POINTS as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &series, |b, series| {
            b.iter(|| resample(black_box(series), DEFAULT_POINTS).unwrap());
        });
    }

    group.finish();
}

/// Benchmark segmenting and resampling whole synthetic cycles
fn bench_cycle_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_curve");

    let archive = generate(&SyntheticConfig {
        cells: 1,
        cycles: 11,
        ..Default::default()
    });
    let cycles: Vec<_> = (1..=10).map(|j| archive.cycle(0, j).unwrap()).collect();

    for points in [100usize, DEFAULT_POINTS, 2_000] {
        group.throughput(Throughput::Elements(cycles.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, &points| {
            b.iter(|| {
                for cycle in &cycles {
                    black_box(cycle_curve(black_box(cycle), points).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resample, bench_cycle_curve);
criterion_main!(benches);
