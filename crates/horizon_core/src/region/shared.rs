//! The shared region and its writer / reader handles.
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!                 │         SharedRegion         │
//!                 │  [AtomicU32; REGION_LEN]     │
//!                 │  writer_claimed, readers     │
//!                 └──────────────┬───────────────┘
//!                                │
//!              ┌─────────────────┼─────────────────┐
//!              ▼                                   ▼
//!      ┌───────────────┐                   ┌───────────────┐
//!      │ RegionWriter  │                   │ RegionReader  │
//!      │ (stepper, x1) │                   │ (render, xN)  │
//!      └───────────────┘                   └───────────────┘
//! ```
//!
//! ## Memory ordering
//!
//! Writer: `seq += 1` (relaxed), release fence, relaxed stores,
//! `seq += 1` (release).
//! Reader: `s1 = seq` (acquire), relaxed loads, acquire fence,
//! `s2 = seq` (relaxed). The copy is valid iff `s1` is even and `s1 == s2`.

use std::sync::atomic::{fence, AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use super::blocks::{CameraBlock, PhysicsBlock};
use super::layout::{
    self, control, telemetry, CAMERA_OFFSET, LUT_LEN, LUT_OFFSET, LUT_SAMPLES, PHYSICS_OFFSET,
    REGION_LEN, TELEMETRY_OFFSET,
};

/// Fixed-layout block of atomically accessed words.
///
/// Allocated once and shared through `Arc`. Exactly one [`RegionWriter`]
/// may exist at a time; any number of [`RegionReader`]s.
pub struct SharedRegion {
    /// One word per float element.
    words: Box<[AtomicU32]>,
    /// Whether a writer handle is currently held.
    writer_claimed: AtomicBool,
    /// Number of live reader handles.
    readers: AtomicUsize,
}

impl SharedRegion {
    /// Allocates a zeroed region.
    #[must_use]
    pub fn new() -> Arc<Self> {
        let words = (0..REGION_LEN).map(|_| AtomicU32::new(0)).collect();
        Arc::new(Self {
            words,
            writer_claimed: AtomicBool::new(false),
            readers: AtomicUsize::new(0),
        })
    }

    /// Region length in words.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; the region has a fixed non-zero size.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Claims the single writer handle.
    ///
    /// # Panics
    ///
    /// Panics if a writer handle is already held.
    #[must_use]
    pub fn writer(self: &Arc<Self>) -> RegionWriter {
        match self.try_writer() {
            Some(writer) => writer,
            None => panic!("Double writer! Only one writer handle allowed at a time."),
        }
    }

    /// Claims the writer handle if nobody holds it.
    #[must_use]
    pub fn try_writer(self: &Arc<Self>) -> Option<RegionWriter> {
        if self.writer_claimed.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(RegionWriter {
            region: Arc::clone(self),
        })
    }

    /// Creates a reader handle.
    #[must_use]
    pub fn reader(self: &Arc<Self>) -> RegionReader {
        self.readers.fetch_add(1, Ordering::AcqRel);
        RegionReader {
            region: Arc::clone(self),
            last_sequence: None,
        }
    }

    /// Whether a writer handle is held.
    #[inline]
    #[must_use]
    pub fn has_writer(&self) -> bool {
        self.writer_claimed.load(Ordering::Acquire)
    }

    /// Number of live reader handles.
    #[inline]
    #[must_use]
    pub fn reader_count(&self) -> usize {
        self.readers.load(Ordering::Acquire)
    }

    /// Current publication sequence.
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.word(TELEMETRY_OFFSET + telemetry::SEQUENCE)
            .load(Ordering::Acquire)
    }

    /// Loads a word as `f32`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= REGION_LEN`.
    #[inline]
    #[must_use]
    pub fn load_f32(&self, index: usize) -> f32 {
        f32::from_bits(self.words[index].load(Ordering::Acquire))
    }

    /// Loads a word as an integer.
    ///
    /// # Panics
    ///
    /// Panics if `index >= REGION_LEN`.
    #[inline]
    #[must_use]
    pub fn load_u32(&self, index: usize) -> u32 {
        self.words[index].load(Ordering::Acquire)
    }

    /// Reads every TELEMETRY counter.
    #[must_use]
    pub fn telemetry(&self) -> TelemetrySnapshot {
        let t = |i: usize| self.load_u32(TELEMETRY_OFFSET + i);
        TelemetrySnapshot {
            sequence: t(telemetry::SEQUENCE),
            tick_count: t(telemetry::TICK_COUNT),
            late_ticks: t(telemetry::LATE_TICKS),
            last_tick_micros: t(telemetry::LAST_TICK_MICROS),
            idle: t(telemetry::IDLE) != 0,
            lut_generation: t(telemetry::LUT_GENERATION),
            alive: t(telemetry::ALIVE) != 0,
        }
    }

    #[inline]
    fn word(&self, index: usize) -> &AtomicU32 {
        &self.words[index]
    }

    #[inline]
    fn store_f32(&self, index: usize, value: f32) {
        self.words[index].store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    fn store_u32(&self, index: usize, value: u32) {
        self.words[index].store(value, Ordering::Release);
    }

    fn add_f32(&self, index: usize, delta: f32) {
        // Closure never returns None, so the update always succeeds
        let _ = self.words[index].fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
            Some((f32::from_bits(bits) + delta).to_bits())
        });
    }

    fn take_f32(&self, index: usize) -> f32 {
        f32::from_bits(self.words[index].swap(0, Ordering::AcqRel))
    }

    fn copy_out(&self, offset: usize, out: &mut [f32]) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = f32::from_bits(self.words[offset + i].load(Ordering::Relaxed));
        }
    }

    fn copy_in(&self, offset: usize, values: &[f32]) {
        for (i, value) in values.iter().enumerate() {
            self.store_f32(offset + i, *value);
        }
    }
}

/// TELEMETRY counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Publication sequence (even when quiescent).
    pub sequence: u32,
    /// Completed stepper ticks.
    pub tick_count: u32,
    /// Ticks that overran their budget.
    pub late_ticks: u32,
    /// Duration of the most recent tick, microseconds.
    pub last_tick_micros: u32,
    /// Stepper is idle-throttled.
    pub idle: bool,
    /// Generation of the LUT contents.
    pub lut_generation: u32,
    /// Stepper loop is running.
    pub alive: bool,
}

/// Input drained from CONTROL by the stepper.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    /// Latest render frame interval, seconds.
    pub frame_dt: f32,
    /// Accumulated azimuth delta since the last drain.
    pub dtheta: f32,
    /// Accumulated polar delta since the last drain.
    pub dphi: f32,
    /// Accumulated zoom delta since the last drain.
    pub dzoom: f32,
    /// Render-side input generation.
    pub input_generation: u32,
}

impl ControlInput {
    /// True when any orbit or zoom delta is pending.
    #[must_use]
    pub fn has_motion(&self) -> bool {
        self.dtheta != 0.0 || self.dphi != 0.0 || self.dzoom != 0.0
    }
}

/// Exclusive writer handle (the physics stepper).
pub struct RegionWriter {
    region: Arc<SharedRegion>,
}

impl RegionWriter {
    /// Starts a publication: the sequence becomes odd until the guard drops.
    #[must_use]
    pub fn begin(&mut self) -> PublishGuard<'_> {
        let seq = self.region.word(TELEMETRY_OFFSET + telemetry::SEQUENCE);
        seq.fetch_add(1, Ordering::Relaxed);
        fence(Ordering::Release);
        PublishGuard {
            region: &self.region,
        }
    }

    /// Publishes camera and physics in one sequence bracket.
    pub fn publish(&mut self, camera: &CameraBlock, physics: &PhysicsBlock) {
        let guard = self.begin();
        guard.write_camera(camera);
        guard.write_physics(physics);
    }

    /// Takes pending render-side input. Deltas are reset to zero.
    pub fn drain_control(&mut self) -> ControlInput {
        let r = &self.region;
        ControlInput {
            frame_dt: r.load_f32(layout::CONTROL_OFFSET + control::FRAME_DT),
            dtheta: r.take_f32(layout::CONTROL_OFFSET + control::ORBIT_THETA),
            dphi: r.take_f32(layout::CONTROL_OFFSET + control::ORBIT_PHI),
            dzoom: r.take_f32(layout::CONTROL_OFFSET + control::ZOOM),
            input_generation: r.load_u32(layout::CONTROL_OFFSET + control::INPUT_GENERATION),
        }
    }

    /// Mirrors the applied configuration into CONTROL.
    #[allow(clippy::cast_possible_truncation)]
    pub fn mirror_config(&mut self, mass: f64, spin: f64, generation: u32) {
        let r = &self.region;
        r.store_f32(layout::CONTROL_OFFSET + control::MASS, mass as f32);
        r.store_f32(layout::CONTROL_OFFSET + control::SPIN, spin as f32);
        r.store_u32(layout::CONTROL_OFFSET + control::CONFIG_GENERATION, generation);
    }

    /// Records one completed tick in TELEMETRY.
    pub fn record_tick(&mut self, tick_micros: u32, late: bool) {
        let r = &self.region;
        r.word(TELEMETRY_OFFSET + telemetry::TICK_COUNT)
            .fetch_add(1, Ordering::AcqRel);
        if late {
            r.word(TELEMETRY_OFFSET + telemetry::LATE_TICKS)
                .fetch_add(1, Ordering::AcqRel);
        }
        r.store_u32(TELEMETRY_OFFSET + telemetry::LAST_TICK_MICROS, tick_micros);
    }

    /// Sets the idle flag.
    pub fn set_idle(&mut self, idle: bool) {
        self.region
            .store_u32(TELEMETRY_OFFSET + telemetry::IDLE, u32::from(idle));
    }

    /// Sets the liveness flag.
    pub fn set_alive(&mut self, alive: bool) {
        self.region
            .store_u32(TELEMETRY_OFFSET + telemetry::ALIVE, u32::from(alive));
    }

    /// The region this handle writes to.
    #[must_use]
    pub fn region(&self) -> &Arc<SharedRegion> {
        &self.region
    }
}

impl Drop for RegionWriter {
    fn drop(&mut self) {
        self.region.writer_claimed.store(false, Ordering::Release);
    }
}

/// Open publication. The sequence is odd while this guard lives.
pub struct PublishGuard<'a> {
    region: &'a SharedRegion,
}

impl PublishGuard<'_> {
    /// Copies the camera block into CAMERA.
    pub fn write_camera(&self, camera: &CameraBlock) {
        self.region.copy_in(CAMERA_OFFSET, camera.as_floats());
    }

    /// Copies the physics block into PHYSICS.
    pub fn write_physics(&self, physics: &PhysicsBlock) {
        self.region.copy_in(PHYSICS_OFFSET, physics.as_floats());
    }

    /// Writes the disk LUT: `LUT_SAMPLES` temperatures, then RGB triples.
    ///
    /// # Panics
    ///
    /// Panics if `temperatures.len() != LUT_SAMPLES` or
    /// `rgb.len() != 3 * LUT_SAMPLES`.
    pub fn write_lut(&self, temperatures: &[f32], rgb: &[f32], generation: u32) {
        assert_eq!(temperatures.len(), LUT_SAMPLES, "LUT temperature length");
        assert_eq!(rgb.len(), LUT_SAMPLES * 3, "LUT rgb length");
        self.region.copy_in(LUT_OFFSET, temperatures);
        self.region.copy_in(LUT_OFFSET + LUT_SAMPLES, rgb);
        self.region
            .store_u32(TELEMETRY_OFFSET + telemetry::LUT_GENERATION, generation);
    }
}

impl Drop for PublishGuard<'_> {
    fn drop(&mut self) {
        self.region
            .word(TELEMETRY_OFFSET + telemetry::SEQUENCE)
            .fetch_add(1, Ordering::Release);
    }
}

/// Result of one optimistic read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A consistent copy at this sequence was written to the outputs.
    Fresh(u32),
    /// Sequence unchanged since the previous fresh read; outputs untouched.
    Unchanged(u32),
    /// A write overlapped the copy; outputs hold garbage and must be discarded.
    Torn,
}

/// Reader handle (render side). Also the writer of CONTROL input fields.
pub struct RegionReader {
    region: Arc<SharedRegion>,
    last_sequence: Option<u32>,
}

impl RegionReader {
    /// Copies CAMERA and PHYSICS into the outputs if a new consistent
    /// publication is available.
    ///
    /// On [`ReadOutcome::Torn`] the outputs may be partially overwritten;
    /// read into scratch buffers and only promote on `Fresh`.
    pub fn read(&mut self, camera: &mut CameraBlock, physics: &mut PhysicsBlock) -> ReadOutcome {
        let seq = self.region.word(TELEMETRY_OFFSET + telemetry::SEQUENCE);
        let s1 = seq.load(Ordering::Acquire);
        if s1 & 1 == 1 {
            return ReadOutcome::Torn;
        }
        if self.last_sequence == Some(s1) {
            return ReadOutcome::Unchanged(s1);
        }

        self.region.copy_out(CAMERA_OFFSET, camera.as_floats_mut());
        self.region.copy_out(PHYSICS_OFFSET, physics.as_floats_mut());

        fence(Ordering::Acquire);
        let s2 = seq.load(Ordering::Relaxed);
        if s1 != s2 {
            return ReadOutcome::Torn;
        }
        self.last_sequence = Some(s1);
        ReadOutcome::Fresh(s1)
    }

    /// Copies the LUT into `out` (length `LUT_LEN`).
    ///
    /// Returns false when a publication overlapped the copy.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() != LUT_LEN`.
    pub fn read_lut(&self, out: &mut [f32]) -> bool {
        assert_eq!(out.len(), LUT_LEN, "LUT output length");
        let seq = self.region.word(TELEMETRY_OFFSET + telemetry::SEQUENCE);
        let s1 = seq.load(Ordering::Acquire);
        if s1 & 1 == 1 {
            return false;
        }
        self.region.copy_out(LUT_OFFSET, out);
        fence(Ordering::Acquire);
        s1 == seq.load(Ordering::Relaxed)
    }

    /// Forces the next [`read`](Self::read) to copy even if the sequence
    /// did not move.
    pub fn forget(&mut self) {
        self.last_sequence = None;
    }

    /// Sequence of the last fresh read.
    #[must_use]
    pub fn last_sequence(&self) -> Option<u32> {
        self.last_sequence
    }

    /// Writes the latest render frame interval into CONTROL.
    pub fn set_frame_dt(&self, dt_seconds: f32) {
        self.region.store_f32(
            layout::CONTROL_OFFSET + control::FRAME_DT,
            dt_seconds,
        );
    }

    /// Accumulates orbit and zoom deltas for the stepper to drain.
    pub fn push_orbit(&self, dtheta: f32, dphi: f32, dzoom: f32) {
        let r = &self.region;
        r.add_f32(layout::CONTROL_OFFSET + control::ORBIT_THETA, dtheta);
        r.add_f32(layout::CONTROL_OFFSET + control::ORBIT_PHI, dphi);
        r.add_f32(layout::CONTROL_OFFSET + control::ZOOM, dzoom);
        r.word(layout::CONTROL_OFFSET + control::INPUT_GENERATION)
            .fetch_add(1, Ordering::AcqRel);
    }

    /// Render-side input generation.
    #[must_use]
    pub fn input_generation(&self) -> u32 {
        self.region
            .load_u32(layout::CONTROL_OFFSET + control::INPUT_GENERATION)
    }

    /// Configuration mirrored by the stepper: `(mass, spin, generation)`.
    #[must_use]
    pub fn mirrored_config(&self) -> (f32, f32, u32) {
        let r = &self.region;
        (
            r.load_f32(layout::CONTROL_OFFSET + control::MASS),
            r.load_f32(layout::CONTROL_OFFSET + control::SPIN),
            r.load_u32(layout::CONTROL_OFFSET + control::CONFIG_GENERATION),
        )
    }

    /// TELEMETRY counters.
    #[must_use]
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.region.telemetry()
    }

    /// The region this handle reads from.
    #[must_use]
    pub fn region(&self) -> &Arc<SharedRegion> {
        &self.region
    }
}

impl Clone for RegionReader {
    fn clone(&self) -> Self {
        let mut reader = self.region.reader();
        reader.last_sequence = self.last_sequence;
        reader
    }
}

impl Drop for RegionReader {
    fn drop(&mut self) {
        self.region.readers.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_with(value: f32) -> CameraBlock {
        let mut camera = CameraBlock::default();
        camera.as_floats_mut().fill(value);
        camera
    }

    #[test]
    fn test_region_creation() {
        let region = SharedRegion::new();
        assert_eq!(region.len(), REGION_LEN);
        assert_eq!(region.sequence(), 0);
        assert!(!region.has_writer());
        assert_eq!(region.reader_count(), 0);
    }

    #[test]
    fn test_publish_then_read() {
        let region = SharedRegion::new();
        let mut writer = region.writer();
        let mut reader = region.reader();

        let mut physics = PhysicsBlock::default();
        physics.event_horizon = 2.0;
        writer.publish(&camera_with(3.0), &physics);
        assert_eq!(region.sequence(), 2);

        let (mut camera_out, mut physics_out) = (CameraBlock::default(), PhysicsBlock::default());
        assert_eq!(reader.read(&mut camera_out, &mut physics_out), ReadOutcome::Fresh(2));
        assert_eq!(camera_out, camera_with(3.0));
        assert_eq!(physics_out.event_horizon, 2.0);
    }

    #[test]
    fn test_unchanged_sequence_skips_copy() {
        let region = SharedRegion::new();
        let mut writer = region.writer();
        let mut reader = region.reader();
        writer.publish(&camera_with(1.0), &PhysicsBlock::default());

        let (mut camera, mut physics) = (CameraBlock::default(), PhysicsBlock::default());
        assert!(matches!(reader.read(&mut camera, &mut physics), ReadOutcome::Fresh(_)));

        let mut untouched = camera_with(9.0);
        assert_eq!(reader.read(&mut untouched, &mut physics), ReadOutcome::Unchanged(2));
        assert_eq!(untouched, camera_with(9.0));

        reader.forget();
        assert_eq!(reader.read(&mut untouched, &mut physics), ReadOutcome::Fresh(2));
        assert_eq!(untouched, camera_with(1.0));
    }

    #[test]
    fn test_open_publication_reads_as_torn() {
        let region = SharedRegion::new();
        let mut writer = region.writer();
        let mut reader = region.reader();

        let guard = writer.begin();
        guard.write_camera(&camera_with(5.0));
        assert_eq!(region.sequence() & 1, 1);

        let (mut camera, mut physics) = (CameraBlock::default(), PhysicsBlock::default());
        assert_eq!(reader.read(&mut camera, &mut physics), ReadOutcome::Torn);
        drop(guard);

        assert_eq!(reader.read(&mut camera, &mut physics), ReadOutcome::Fresh(2));
        assert_eq!(camera, camera_with(5.0));
    }

    #[test]
    fn test_single_writer() {
        let region = SharedRegion::new();
        let writer = region.writer();
        assert!(region.has_writer());
        assert!(region.try_writer().is_none());
        drop(writer);
        assert!(!region.has_writer());
        assert!(region.try_writer().is_some());
    }

    #[test]
    #[should_panic(expected = "Double writer")]
    fn test_double_writer_panics() {
        let region = SharedRegion::new();
        let _first = region.writer();
        let _second = region.writer();
    }

    #[test]
    fn test_reader_count_tracks_handles() {
        let region = SharedRegion::new();
        let a = region.reader();
        let b = a.clone();
        assert_eq!(region.reader_count(), 2);
        drop(a);
        drop(b);
        assert_eq!(region.reader_count(), 0);
    }

    #[test]
    fn test_control_accumulates_and_drains() {
        let region = SharedRegion::new();
        let mut writer = region.writer();
        let reader = region.reader();

        reader.set_frame_dt(0.016);
        reader.push_orbit(0.1, 0.0, 0.5);
        reader.push_orbit(0.2, -0.05, 0.0);
        assert_eq!(reader.input_generation(), 2);

        let input = writer.drain_control();
        assert!((input.dtheta - 0.3).abs() < 1e-6);
        assert!((input.dphi + 0.05).abs() < 1e-6);
        assert!((input.dzoom - 0.5).abs() < 1e-6);
        assert!((input.frame_dt - 0.016).abs() < 1e-6);
        assert!(input.has_motion());

        let again = writer.drain_control();
        assert!(!again.has_motion());
        assert_eq!(again.input_generation, 2);
    }

    #[test]
    fn test_config_mirror_and_telemetry() {
        let region = SharedRegion::new();
        let mut writer = region.writer();
        let reader = region.reader();

        writer.mirror_config(4.0, -0.5, 3);
        assert_eq!(reader.mirrored_config(), (4.0, -0.5, 3));

        writer.set_alive(true);
        writer.record_tick(250, false);
        writer.record_tick(9_000, true);
        writer.set_idle(true);
        let t = reader.telemetry();
        assert!(t.alive);
        assert!(t.idle);
        assert_eq!(t.tick_count, 2);
        assert_eq!(t.late_ticks, 1);
        assert_eq!(t.last_tick_micros, 9_000);
    }

    #[test]
    fn test_lut_round_trip() {
        let region = SharedRegion::new();
        let mut writer = region.writer();
        let reader = region.reader();

        let temps: Vec<f32> = (0..LUT_SAMPLES).map(|i| i as f32).collect();
        let rgb = vec![0.5_f32; LUT_SAMPLES * 3];
        writer.begin().write_lut(&temps, &rgb, 7);

        let mut out = vec![0.0_f32; LUT_LEN];
        assert!(reader.read_lut(&mut out));
        assert_eq!(&out[..LUT_SAMPLES], temps.as_slice());
        assert_eq!(out[LUT_SAMPLES], 0.5);
        assert_eq!(reader.telemetry().lut_generation, 7);
    }

    #[test]
    fn test_layout_offsets_are_bit_exact() {
        let region = SharedRegion::new();
        let mut writer = region.writer();
        let mut physics = PhysicsBlock::default();
        physics.mass = 1.25;
        let mut camera = CameraBlock::default();
        camera.position = [10.0, 20.0, 30.0];
        writer.publish(&camera, &physics);

        assert_eq!(region.load_f32(64), 10.0);
        assert_eq!(region.load_f32(66), 30.0);
        assert_eq!(region.load_f32(128), 1.25);
        assert_eq!(region.load_u32(256), 2);
    }
}
