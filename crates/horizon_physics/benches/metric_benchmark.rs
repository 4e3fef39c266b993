//! # Metric Kernel Benchmark
//!
//! The stepper re-derives every quantity whenever mass or spin changes and
//! the LUT bake evaluates the temperature profile 256 times. Both must stay
//! far below one 120 Hz tick (8.3 ms).

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use horizon_physics::{blackbody_rgb, isco, BlackHoleConfig, DiskProfile, MetricQuantities};

fn bench_isco(c: &mut Criterion) {
    let mut group = c.benchmark_group("isco");
    for spin in [0.0, 0.5, 0.998] {
        group.bench_with_input(BenchmarkId::new("prograde", spin), &spin, |b, &spin| {
            b.iter(|| isco(black_box(1.0), black_box(spin), true));
        });
    }
    group.finish();
}

fn bench_quantities(c: &mut Criterion) {
    let config = BlackHoleConfig::new(1.0, 0.7).unwrap_or_default();
    c.bench_function("metric_quantities_compute", |b| {
        b.iter(|| MetricQuantities::compute(black_box(&config)));
    });
}

fn bench_lut_bake(c: &mut Criterion) {
    let config = BlackHoleConfig::new(1.0, 0.7).unwrap_or_default();
    let profile = DiskProfile::new(&config);
    c.bench_function("disk_lut_bake_256", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for i in 0..256 {
                let r = profile.radius_at(f64::from(i) / 255.0);
                let rgb = blackbody_rgb(profile.temperature(black_box(r)));
                sum += rgb[0] + rgb[1] + rgb[2];
            }
            sum
        });
    });
}

criterion_group!(benches, bench_isco, bench_quantities, bench_lut_bake);
criterion_main!(benches);
