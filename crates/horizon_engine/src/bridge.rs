//! # Physics Bridge
//!
//! The render side's single entry point to the simulation.
//!
//! ## State Machine
//!
//! ```text
//! Uninitialized ──ensure_initialized──► Initializing ──ready──► Ready
//!                                            │                    │
//!                      spawn failure / no    │                    │
//!                      threads / timeout     ▼                    │
//!                                        Degraded                 │
//!                                            │                    │
//!                                            └─────shutdown───────┴──► Terminated
//! ```
//!
//! ## Modes
//!
//! | Mode       | Region               | Who steps the engine          |
//! |------------|----------------------|-------------------------------|
//! | `Shared`   | shared with stepper  | stepper thread, 120 Hz        |
//! | `Fallback` | private to the bridge| `tick()` itself, render rate  |
//!
//! Both modes read through the same sequence-checked path and keep a
//! last-known-good snapshot. A torn read or a non-finite value never
//! reaches the renderer.

use std::fmt;
use std::time::{Duration, Instant};

use horizon_core::layout::LUT_LEN;
use horizon_core::{
    CameraBlock, PhysicsBlock, ReadOutcome, RegionReader, RegionWriter, SharedRegion,
    TelemetrySnapshot,
};
use horizon_physics::BlackHoleConfig;

use crate::engine::{EngineSettings, PhysicsEngine};
use crate::error::{EngineError, EngineResult};
use crate::stepper::{StepperHandle, StepperSettings};
use crate::tick::TickStats;

/// Runtime capabilities the bridge may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// A region can be shared across execution contexts.
    pub shared_memory: bool,
    /// Independent execution contexts can be spawned.
    pub threads: bool,
}

impl Capabilities {
    /// Probes the current runtime.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            shared_memory: true,
            threads: std::thread::available_parallelism().is_ok(),
        }
    }

    /// Nothing available: always run the fallback.
    #[must_use]
    pub const fn single_threaded() -> Self {
        Self {
            shared_memory: false,
            threads: false,
        }
    }

    fn supports_stepper(self) -> bool {
        self.shared_memory && self.threads
    }
}

/// Bridge options.
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Engine tunables (both modes).
    pub engine: EngineSettings,
    /// Stepper thread parameters.
    pub stepper: StepperSettings,
    /// Use the stepper thread when the runtime allows it.
    pub threaded: bool,
    /// How long to wait for the stepper before degrading.
    pub ready_timeout: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            stepper: StepperSettings::default(),
            threaded: true,
            ready_timeout: Duration::from_secs(2),
        }
    }
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Nothing allocated yet.
    Uninitialized,
    /// Stepper spawned, waiting for its first publication.
    Initializing,
    /// Stepper running.
    Ready,
    /// Stepping synchronously inside `tick()`.
    Degraded,
    /// Shut down.
    Terminated,
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Degraded => "degraded",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// One frame's view of the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    /// CAMERA segment.
    pub camera: CameraBlock,
    /// PHYSICS segment.
    pub physics: PhysicsBlock,
    /// Sequence the snapshot was published under (0 before the first read).
    pub sequence: u32,
    /// True when this tick produced a new snapshot.
    pub fresh: bool,
}

/// Read-path counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Calls to `tick`.
    pub reads: u64,
    /// Reads that produced a new snapshot.
    pub fresh_reads: u64,
    /// Reads discarded because a publication overlapped.
    pub torn_reads: u64,
    /// Reads discarded because a value was non-finite.
    pub non_finite_rejected: u64,
    /// Reads skipped because the sequence had not moved.
    pub unchanged_skips: u64,
    /// Wake commands sent to an idle stepper.
    pub wakes_sent: u64,
    /// Ticks stepped synchronously in fallback mode.
    pub fallback_steps: u64,
}

struct SharedMode {
    stepper: StepperHandle,
    reader: RegionReader,
    spawned_at: Instant,
}

struct FallbackMode {
    engine: PhysicsEngine,
    writer: RegionWriter,
    reader: RegionReader,
}

enum BridgeMode {
    Shared(SharedMode),
    Fallback(FallbackMode),
}

impl BridgeMode {
    fn reader(&mut self) -> &mut RegionReader {
        match self {
            Self::Shared(shared) => &mut shared.reader,
            Self::Fallback(fallback) => &mut fallback.reader,
        }
    }
}

/// Render-side bridge to the physics stepper.
pub struct PhysicsBridge {
    state: BridgeState,
    mode: Option<BridgeMode>,
    config: BlackHoleConfig,
    options: BridgeOptions,
    capabilities: Capabilities,
    snapshot: FrameSnapshot,
    scratch_camera: CameraBlock,
    scratch_physics: PhysicsBlock,
    lut: Vec<f32>,
    lut_generation: u32,
    stats: BridgeStats,
}

impl PhysicsBridge {
    /// Creates an uninitialized bridge.
    #[must_use]
    pub fn new(config: BlackHoleConfig, options: BridgeOptions, capabilities: Capabilities) -> Self {
        Self {
            state: BridgeState::Uninitialized,
            mode: None,
            config,
            options,
            capabilities,
            snapshot: FrameSnapshot {
                camera: CameraBlock::default(),
                physics: PhysicsBlock::default(),
                sequence: 0,
                fresh: false,
            },
            scratch_camera: CameraBlock::default(),
            scratch_physics: PhysicsBlock::default(),
            lut: vec![0.0; LUT_LEN],
            lut_generation: 0,
            stats: BridgeStats::default(),
        }
    }

    /// Brings the bridge up, or advances a pending start.
    ///
    /// Spawn failures degrade to the fallback; they are not errors.
    ///
    /// # Errors
    ///
    /// [`EngineError::Terminated`] after shutdown, or the engine error
    /// when even the fallback engine cannot be built.
    pub fn ensure_initialized(&mut self) -> EngineResult<BridgeState> {
        match self.state {
            BridgeState::Uninitialized => self.start()?,
            BridgeState::Initializing => self.poll_stepper()?,
            BridgeState::Ready | BridgeState::Degraded => {}
            BridgeState::Terminated => return Err(EngineError::Terminated),
        }
        Ok(self.state)
    }

    fn start(&mut self) -> EngineResult<()> {
        // Seeds last-known-good so the renderer never sees zeros.
        let bootstrap = PhysicsEngine::new(self.config, self.options.engine)?;
        self.snapshot.camera = bootstrap.camera_block();
        self.snapshot.physics = bootstrap.physics_block();

        self.state = BridgeState::Initializing;
        tracing::info!(state = %self.state, "physics bridge starting");

        if !(self.options.threaded && self.capabilities.supports_stepper()) {
            tracing::warn!(capabilities = ?self.capabilities, "shared stepping unavailable");
            return self.degrade();
        }

        let region = SharedRegion::new();
        match StepperHandle::spawn(
            &region,
            self.config,
            self.options.engine,
            self.options.stepper.clone(),
        ) {
            Ok(stepper) => {
                self.mode = Some(BridgeMode::Shared(SharedMode {
                    stepper,
                    reader: region.reader(),
                    spawned_at: Instant::now(),
                }));
                self.poll_stepper()
            }
            Err(e) => {
                tracing::warn!(error = %e, "physics stepper spawn failed");
                self.degrade()
            }
        }
    }

    fn poll_stepper(&mut self) -> EngineResult<()> {
        let Some(BridgeMode::Shared(shared)) = &self.mode else {
            return Ok(());
        };
        let waited = shared.spawned_at.elapsed();
        match shared.stepper.poll_ready() {
            Some(Ok(())) => {
                self.state = BridgeState::Ready;
                tracing::info!(state = %self.state, "physics bridge ready");
                Ok(())
            }
            Some(Err(reason)) => {
                tracing::warn!(%reason, "physics stepper failed to initialize");
                self.degrade()
            }
            None if waited >= self.options.ready_timeout => {
                tracing::warn!(timeout = ?self.options.ready_timeout, "physics stepper not ready in time");
                self.degrade()
            }
            None => Ok(()),
        }
    }

    fn degrade(&mut self) -> EngineResult<()> {
        if let Some(BridgeMode::Shared(mut shared)) = self.mode.take() {
            shared.stepper.shutdown();
        }
        let mut engine = match PhysicsEngine::new(self.config, self.options.engine) {
            Ok(engine) => engine,
            Err(e) => {
                self.state = BridgeState::Uninitialized;
                return Err(e);
            }
        };
        let region = SharedRegion::new();
        let mut writer = region.writer();
        writer.mirror_config(self.config.mass(), self.config.spin(), engine.config_generation());
        engine.publish(&mut writer);

        self.mode = Some(BridgeMode::Fallback(FallbackMode {
            engine,
            writer,
            reader: region.reader(),
        }));
        self.state = BridgeState::Degraded;
        tracing::info!(state = %self.state, "physics bridge running same-thread fallback");
        Ok(())
    }

    /// Advances one render frame and returns the snapshot to draw.
    ///
    /// Never fails: on a torn or non-finite read the previous snapshot is
    /// returned with `fresh == false`.
    pub fn tick(&mut self, dt_seconds: f64) -> &FrameSnapshot {
        self.stats.reads += 1;
        self.snapshot.fresh = false;

        if self.state == BridgeState::Initializing {
            if let Err(e) = self.poll_stepper() {
                tracing::warn!(error = %e, "physics bridge could not degrade");
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let frame_dt = dt_seconds as f32;
        let Some(mode) = self.mode.as_mut() else {
            return &self.snapshot;
        };

        if let BridgeMode::Fallback(fallback) = &mut *mode {
            fallback.reader.set_frame_dt(frame_dt);
            let input = fallback.writer.drain_control();
            fallback.engine.step(dt_seconds, &input);
            fallback.engine.publish(&mut fallback.writer);
            self.stats.fallback_steps += 1;
        } else {
            mode.reader().set_frame_dt(frame_dt);
        }

        let outcome = mode
            .reader()
            .read(&mut self.scratch_camera, &mut self.scratch_physics);
        match outcome {
            ReadOutcome::Fresh(sequence) => {
                if self.scratch_camera.is_finite() && self.scratch_physics.is_finite() {
                    self.snapshot.camera = self.scratch_camera;
                    self.snapshot.physics = self.scratch_physics;
                    self.snapshot.sequence = sequence;
                    self.snapshot.fresh = true;
                    self.stats.fresh_reads += 1;
                } else {
                    self.stats.non_finite_rejected += 1;
                    tracing::trace!(sequence, "non-finite snapshot rejected");
                }
            }
            ReadOutcome::Unchanged(_) => self.stats.unchanged_skips += 1,
            ReadOutcome::Torn => {
                self.stats.torn_reads += 1;
                tracing::trace!("torn read discarded");
            }
        }
        &self.snapshot
    }

    /// Queues camera orbit / zoom deltas; wakes an idle stepper.
    pub fn orbit(&mut self, dtheta: f64, dphi: f64, dzoom: f64) {
        #[allow(clippy::cast_possible_truncation)]
        let (dtheta, dphi, dzoom) = (dtheta as f32, dphi as f32, dzoom as f32);
        match self.mode.as_mut() {
            Some(BridgeMode::Shared(shared)) => {
                shared.reader.push_orbit(dtheta, dphi, dzoom);
                if shared.reader.telemetry().idle && shared.stepper.wake() {
                    self.stats.wakes_sent += 1;
                }
            }
            Some(BridgeMode::Fallback(fallback)) => fallback.reader.push_orbit(dtheta, dphi, dzoom),
            None => {}
        }
    }

    /// Applies a validated configuration.
    ///
    /// # Errors
    ///
    /// [`EngineError::Terminated`] after shutdown.
    pub fn configure(&mut self, config: BlackHoleConfig) -> EngineResult<()> {
        if self.state == BridgeState::Terminated {
            return Err(EngineError::Terminated);
        }
        self.config = config;
        match self.mode.as_mut() {
            Some(BridgeMode::Shared(shared)) => {
                if !shared.stepper.configure(config) {
                    tracing::warn!("physics stepper gone; configuration not delivered");
                }
            }
            Some(BridgeMode::Fallback(fallback)) => {
                if fallback.engine.configure(config) {
                    fallback.writer.mirror_config(
                        config.mass(),
                        config.spin(),
                        fallback.engine.config_generation(),
                    );
                }
            }
            None => {}
        }
        Ok(())
    }

    /// The disk LUT, refreshed when its generation moved.
    ///
    /// Returns `None` before initialization.
    pub fn lut(&mut self) -> Option<&[f32]> {
        let reader = self.mode.as_mut()?.reader();
        let generation = reader.telemetry().lut_generation;
        if generation != self.lut_generation && reader.read_lut(&mut self.lut) {
            self.lut_generation = generation;
        }
        (self.lut_generation != 0).then_some(self.lut.as_slice())
    }

    /// Latest snapshot without advancing.
    #[must_use]
    pub fn snapshot(&self) -> &FrameSnapshot {
        &self.snapshot
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// True when a stepper thread drives the simulation.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self.mode, Some(BridgeMode::Shared(_)))
    }

    /// Configuration most recently applied through the bridge.
    #[must_use]
    pub fn config(&self) -> BlackHoleConfig {
        self.config
    }

    /// Read-path counters.
    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// TELEMETRY counters of the active region.
    #[must_use]
    pub fn telemetry(&self) -> Option<TelemetrySnapshot> {
        match self.mode.as_ref()? {
            BridgeMode::Shared(shared) => Some(shared.reader.telemetry()),
            BridgeMode::Fallback(fallback) => Some(fallback.reader.telemetry()),
        }
    }

    /// Stepper tick statistics (shared mode only).
    #[must_use]
    pub fn stepper_stats(&self) -> Option<TickStats> {
        match self.mode.as_ref()? {
            BridgeMode::Shared(shared) => Some(shared.stepper.stats()),
            BridgeMode::Fallback(_) => None,
        }
    }

    /// Stops the stepper and releases the region.
    pub fn shutdown(&mut self) {
        if self.state == BridgeState::Terminated {
            return;
        }
        if let Some(BridgeMode::Shared(mut shared)) = self.mode.take() {
            shared.stepper.shutdown();
        }
        self.mode = None;
        self.state = BridgeState::Terminated;
        tracing::info!(state = %self.state, "physics bridge shut down");
    }
}

impl Drop for PhysicsBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback_bridge() -> PhysicsBridge {
        PhysicsBridge::new(
            BlackHoleConfig::schwarzschild(),
            BridgeOptions::default(),
            Capabilities::single_threaded(),
        )
    }

    /// Points the fallback's stepping at a scratch region and hands back
    /// the writer of the region the bridge still reads.
    fn take_read_side_writer(bridge: &mut PhysicsBridge) -> RegionWriter {
        match bridge.mode.as_mut() {
            Some(BridgeMode::Fallback(fallback)) => {
                std::mem::replace(&mut fallback.writer, SharedRegion::new().writer())
            }
            _ => panic!("bridge not in fallback mode"),
        }
    }

    #[test]
    fn test_starts_uninitialized() {
        let mut bridge = fallback_bridge();
        assert_eq!(bridge.state(), BridgeState::Uninitialized);
        assert!(bridge.telemetry().is_none());
        assert!(bridge.lut().is_none());
        assert_eq!(bridge.tick(0.016).sequence, 0);
    }

    #[test]
    fn test_no_threads_degrades() {
        let mut bridge = fallback_bridge();
        assert_eq!(bridge.ensure_initialized(), Ok(BridgeState::Degraded));
        assert!(!bridge.is_shared());
        assert_eq!(bridge.snapshot().physics.event_horizon, 2.0);
    }

    #[test]
    fn test_fallback_tick_is_fresh_every_frame() {
        let mut bridge = fallback_bridge();
        bridge.ensure_initialized().expect("init");
        let first = *bridge.tick(0.016);
        let second = *bridge.tick(0.016);
        assert!(first.fresh && second.fresh);
        assert!(second.sequence > first.sequence);
        assert!(second.physics.coordinate_time > first.physics.coordinate_time);
        assert_eq!(bridge.stats().fallback_steps, 2);
    }

    #[test]
    fn test_fallback_orbit_and_configure() {
        let mut bridge = fallback_bridge();
        bridge.ensure_initialized().expect("init");
        bridge.orbit(0.5, 0.0, 0.0);
        let theta = bridge.tick(0.016).camera.theta;
        assert!(theta > 0.0);

        let config = BlackHoleConfig::new(2.0, 0.0).expect("valid");
        bridge.configure(config).expect("configure");
        let snapshot = bridge.tick(0.016);
        assert_eq!(snapshot.physics.event_horizon, 4.0);
        assert_eq!(snapshot.physics.config_generation, 1.0);
    }

    #[test]
    fn test_non_finite_snapshot_keeps_last_good() {
        let mut bridge = fallback_bridge();
        bridge.ensure_initialized().expect("init");
        let good = *bridge.tick(0.016);
        assert!(good.fresh);

        let mut writer = take_read_side_writer(&mut bridge);
        let mut physics = good.physics;
        physics.disk_phase = f32::NAN;
        writer.publish(&good.camera, &physics);

        assert_eq!(*bridge.tick(0.016), FrameSnapshot { fresh: false, ..good });
        assert_eq!(bridge.stats().non_finite_rejected, 1);

        let mut camera = good.camera;
        camera.theta = f32::INFINITY;
        writer.publish(&camera, &good.physics);
        assert_eq!(*bridge.tick(0.016), FrameSnapshot { fresh: false, ..good });
        assert_eq!(bridge.stats().non_finite_rejected, 2);

        physics.disk_phase = 1.25;
        writer.publish(&good.camera, &physics);
        let recovered = *bridge.tick(0.016);
        assert!(recovered.fresh);
        assert_eq!(recovered.physics.disk_phase, 1.25);
        assert!(recovered.sequence > good.sequence);
    }

    #[test]
    fn test_torn_read_keeps_last_good() {
        let mut bridge = fallback_bridge();
        bridge.ensure_initialized().expect("init");
        let good = *bridge.tick(0.016);

        let mut writer = take_read_side_writer(&mut bridge);
        let mut physics = good.physics;
        physics.disk_phase = 2.5;
        {
            let guard = writer.begin();
            guard.write_physics(&physics);

            assert_eq!(*bridge.tick(0.016), FrameSnapshot { fresh: false, ..good });
            assert_eq!(bridge.stats().torn_reads, 1);
            assert_eq!(*bridge.tick(0.016), FrameSnapshot { fresh: false, ..good });
            assert_eq!(bridge.stats().torn_reads, 2);
        }

        let after = *bridge.tick(0.016);
        assert!(after.fresh);
        assert_eq!(after.physics.disk_phase, 2.5);
        assert_eq!(bridge.stats().torn_reads, 2);
        assert_eq!(bridge.stats().non_finite_rejected, 0);
    }

    #[test]
    fn test_lut_available_after_init() {
        let mut bridge = fallback_bridge();
        bridge.ensure_initialized().expect("init");
        let lut = bridge.lut().expect("lut");
        assert_eq!(lut.len(), LUT_LEN);
        assert!((lut[0] - 20_000.0).abs() < 1.0);
    }

    #[test]
    fn test_invalid_engine_settings_are_fatal() {
        let options = BridgeOptions {
            engine: EngineSettings {
                max_step_seconds: f64::NAN,
                ..EngineSettings::default()
            },
            ..BridgeOptions::default()
        };
        let mut bridge = PhysicsBridge::new(
            BlackHoleConfig::schwarzschild(),
            options,
            Capabilities::single_threaded(),
        );
        assert!(matches!(bridge.ensure_initialized(), Err(EngineError::InvalidSettings(_))));
        assert_eq!(bridge.state(), BridgeState::Uninitialized);
    }

    #[test]
    fn test_shutdown_is_terminal() {
        let mut bridge = fallback_bridge();
        bridge.ensure_initialized().expect("init");
        bridge.shutdown();
        assert_eq!(bridge.state(), BridgeState::Terminated);
        assert_eq!(bridge.ensure_initialized(), Err(EngineError::Terminated));
        assert_eq!(
            bridge.configure(BlackHoleConfig::schwarzschild()),
            Err(EngineError::Terminated)
        );
        let before = *bridge.snapshot();
        assert_eq!(*bridge.tick(0.016), FrameSnapshot { fresh: false, ..before });
    }
}
