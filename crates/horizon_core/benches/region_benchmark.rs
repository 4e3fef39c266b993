//! # Shared Region Benchmark
//!
//! The render side reads the region once per frame and the stepper
//! publishes 120 times per second. A fresh read copies 80 words.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use horizon_core::{CameraBlock, PhysicsBlock, SharedRegion};

fn bench_publish(c: &mut Criterion) {
    let region = SharedRegion::new();
    let mut writer = region.writer();
    let camera = CameraBlock::default();
    let physics = PhysicsBlock::default();
    c.bench_function("region_publish", |b| {
        b.iter(|| writer.publish(black_box(&camera), black_box(&physics)));
    });
}

fn bench_read(c: &mut Criterion) {
    let region = SharedRegion::new();
    let mut writer = region.writer();
    let mut reader = region.reader();
    let mut camera = CameraBlock::default();
    let mut physics = PhysicsBlock::default();

    c.bench_function("region_read_fresh", |b| {
        b.iter(|| {
            reader.forget();
            black_box(reader.read(&mut camera, &mut physics))
        });
    });

    writer.publish(&CameraBlock::default(), &PhysicsBlock::default());
    let _ = reader.read(&mut camera, &mut physics);
    c.bench_function("region_read_unchanged", |b| {
        b.iter(|| black_box(reader.read(&mut camera, &mut physics)));
    });
}

fn bench_control(c: &mut Criterion) {
    let region = SharedRegion::new();
    let mut writer = region.writer();
    let reader = region.reader();
    c.bench_function("control_push_and_drain", |b| {
        b.iter(|| {
            reader.push_orbit(black_box(0.01), black_box(-0.02), black_box(0.0));
            black_box(writer.drain_control())
        });
    });
}

criterion_group!(benches, bench_publish, bench_read, bench_control);
criterion_main!(benches);
