//! Cross-thread publication checks for the shared region.
//!
//! Every published block holds one value repeated in every float, so a
//! torn copy shows up as a block with mixed values.

#![allow(missing_docs)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use horizon_core::{CameraBlock, PhysicsBlock, ReadOutcome, SharedRegion};

fn uniform(value: f32) -> (CameraBlock, PhysicsBlock) {
    let mut camera = CameraBlock::default();
    let mut physics = PhysicsBlock::default();
    camera.as_floats_mut().fill(value);
    physics.as_floats_mut().fill(value);
    (camera, physics)
}

fn is_uniform(camera: &CameraBlock, physics: &PhysicsBlock) -> bool {
    let first = camera.as_floats()[0];
    camera.as_floats().iter().all(|v| *v == first)
        && physics.as_floats().iter().all(|v| *v == first)
}

#[test]
fn test_fresh_reads_are_never_mixed() {
    let region = SharedRegion::new();
    let done = Arc::new(AtomicBool::new(false));

    let writer_region = Arc::clone(&region);
    let writer_done = Arc::clone(&done);
    let writer = thread::spawn(move || {
        let mut writer = writer_region.writer();
        for i in 0..20_000_u32 {
            #[allow(clippy::cast_precision_loss)]
            let (camera, physics) = uniform(i as f32);
            writer.publish(&camera, &physics);
        }
        writer_done.store(true, Ordering::Release);
    });

    let mut reader = region.reader();
    let mut camera = CameraBlock::default();
    let mut physics = PhysicsBlock::default();
    let mut last_value = -1.0_f32;

    while !done.load(Ordering::Acquire) {
        match reader.read(&mut camera, &mut physics) {
            ReadOutcome::Fresh(seq) => {
                assert_eq!(seq % 2, 0);
                assert!(is_uniform(&camera, &physics), "torn copy reported as fresh");
                assert!(camera.as_floats()[0] >= last_value, "publication went backwards");
                last_value = camera.as_floats()[0];
            }
            ReadOutcome::Unchanged(_) | ReadOutcome::Torn => {}
        }
    }
    writer.join().expect("writer thread panicked");

    reader.forget();
    assert!(matches!(reader.read(&mut camera, &mut physics), ReadOutcome::Fresh(40_000)));
    assert_eq!(camera.as_floats()[0], 19_999.0);
}

#[test]
fn test_deltas_survive_concurrent_producers() {
    let region = SharedRegion::new();
    let mut writer = region.writer();

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let reader = region.reader();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    reader.push_orbit(1.0, 0.0, 0.0);
                }
            })
        })
        .collect();

    for handle in producers {
        handle.join().expect("producer panicked");
    }
    let total = writer.drain_control().dtheta;

    assert_eq!(total, 4_000.0);
    assert_eq!(region.reader().input_generation(), 4_000);
}
