//! # Physics Stepper Thread
//!
//! Owns the region's writer handle and a [`PhysicsEngine`]. Each tick:
//!
//! 1. drain CONTROL deltas
//! 2. step the engine by the measured interval (clamped)
//! 3. publish CAMERA / PHYSICS under the sequence counter
//! 4. record TELEMETRY, then wait on the command channel until the next tick
//!
//! Shutdown is cooperative: the liveness flag is checked between ticks and
//! a `Shutdown` command interrupts the wait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use parking_lot::Mutex;

use horizon_core::{RegionWriter, SharedRegion};
use horizon_physics::BlackHoleConfig;

use crate::engine::{EngineSettings, PhysicsEngine};
use crate::error::{EngineError, EngineResult};
use crate::tick::{PacerSettings, TickPacer, TickStats};

/// Messages from the render side to the stepper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepperCommand {
    /// Apply a new mass / spin.
    Configure(BlackHoleConfig),
    /// Leave the idle throttle and tick now.
    Wake,
    /// Stop after the current tick.
    Shutdown,
}

/// Stepper thread parameters.
#[derive(Debug, Clone)]
pub struct StepperSettings {
    /// Tick pacing.
    pub pacer: PacerSettings,
    /// Command channel capacity.
    pub channel_capacity: usize,
    /// Thread name.
    pub thread_name: String,
}

impl Default for StepperSettings {
    fn default() -> Self {
        Self {
            pacer: PacerSettings::default(),
            channel_capacity: 64,
            thread_name: "horizon-stepper".to_string(),
        }
    }
}

/// Handle to a running stepper thread.
pub struct StepperHandle {
    commands: Sender<StepperCommand>,
    ready: Receiver<Result<(), String>>,
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<TickStats>>,
    handle: Option<JoinHandle<()>>,
}

impl StepperHandle {
    /// Claims the writer of `region` and starts the stepper thread.
    ///
    /// Returns as soon as the thread exists; readiness is reported through
    /// [`poll_ready`](Self::poll_ready).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StepperSpawn`] if the region already has a
    /// writer or the OS refuses the thread.
    pub fn spawn(
        region: &Arc<SharedRegion>,
        config: BlackHoleConfig,
        engine: EngineSettings,
        settings: StepperSettings,
    ) -> EngineResult<Self> {
        let writer = region
            .try_writer()
            .ok_or_else(|| EngineError::StepperSpawn("region already has a writer".to_string()))?;

        let (commands, command_rx) = bounded(settings.channel_capacity.max(1));
        let (ready_tx, ready) = bounded(1);
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(Mutex::new(TickStats::default()));

        let thread_running = Arc::clone(&running);
        let thread_stats = Arc::clone(&stats);
        let pacer = settings.pacer;

        let handle = thread::Builder::new()
            .name(settings.thread_name)
            .spawn(move || {
                Self::stepper_loop(
                    writer,
                    &command_rx,
                    &ready_tx,
                    &thread_running,
                    &thread_stats,
                    config,
                    engine,
                    pacer,
                );
            })
            .map_err(|e| EngineError::StepperSpawn(e.to_string()))?;

        Ok(Self {
            commands,
            ready,
            running,
            stats,
            handle: Some(handle),
        })
    }

    /// Stepper thread main loop.
    #[allow(clippy::too_many_arguments, clippy::needless_pass_by_value)]
    fn stepper_loop(
        mut writer: RegionWriter,
        commands: &Receiver<StepperCommand>,
        ready: &Sender<Result<(), String>>,
        running: &AtomicBool,
        stats: &Mutex<TickStats>,
        config: BlackHoleConfig,
        settings: EngineSettings,
        pacer: PacerSettings,
    ) {
        let mut engine = match PhysicsEngine::new(config, settings) {
            Ok(engine) => engine,
            Err(e) => {
                running.store(false, Ordering::Release);
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };

        writer.mirror_config(config.mass(), config.spin(), engine.config_generation());
        engine.publish(&mut writer);
        writer.set_alive(true);
        let _ = ready.send(Ok(()));

        let mut pacer = TickPacer::new(pacer, Instant::now());
        let mut input_generation = 0_u32;

        while running.load(Ordering::Acquire) {
            let start = Instant::now();
            let dt = pacer.begin_tick(start);

            let input = writer.drain_control();
            if input.has_motion() || input.input_generation != input_generation {
                input_generation = input.input_generation;
                pacer.note_input(start);
            }
            engine.step(dt, &input);

            if pacer.update_idle(start) {
                let idle = pacer.is_idle();
                engine.set_idle(idle);
                writer.set_idle(idle);
                tracing::debug!(idle, "stepper throttle changed");
            }
            engine.publish(&mut writer);

            let (micros, late) = pacer.end_tick(start, Instant::now());
            writer.record_tick(micros, late);
            *stats.lock() = *pacer.stats();

            let wait = pacer.time_until_next(Instant::now());
            match commands.recv_timeout(wait) {
                Ok(command) => {
                    if !Self::apply(command, &mut engine, &mut writer, &mut pacer) {
                        break;
                    }
                    if !Self::drain_pending(commands, &mut engine, &mut writer, &mut pacer) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        running.store(false, Ordering::Release);
        writer.set_alive(false);
        tracing::debug!(ticks = pacer.tick_count(), "stepper stopped");
    }

    /// Applies one command. Returns false on shutdown.
    fn apply(
        command: StepperCommand,
        engine: &mut PhysicsEngine,
        writer: &mut RegionWriter,
        pacer: &mut TickPacer,
    ) -> bool {
        match command {
            StepperCommand::Configure(config) => {
                if engine.configure(config) {
                    writer.mirror_config(config.mass(), config.spin(), engine.config_generation());
                }
                pacer.note_input(Instant::now());
                true
            }
            StepperCommand::Wake => {
                pacer.note_input(Instant::now());
                true
            }
            StepperCommand::Shutdown => false,
        }
    }

    fn drain_pending(
        commands: &Receiver<StepperCommand>,
        engine: &mut PhysicsEngine,
        writer: &mut RegionWriter,
        pacer: &mut TickPacer,
    ) -> bool {
        loop {
            match commands.try_recv() {
                Ok(command) => {
                    if !Self::apply(command, engine, writer, pacer) {
                        return false;
                    }
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    /// Non-blocking readiness check.
    ///
    /// `Some(Ok)` once the engine is built and the first publication is
    /// visible, `Some(Err)` if the thread failed or exited first.
    #[must_use]
    pub fn poll_ready(&self) -> Option<Result<(), String>> {
        match self.ready.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(Err("stepper exited before signalling readiness".to_string()))
            }
        }
    }

    /// Sends a configuration change. Blocks only if the channel is full.
    ///
    /// Returns false if the stepper is gone.
    pub fn configure(&self, config: BlackHoleConfig) -> bool {
        self.commands.send(StepperCommand::Configure(config)).is_ok()
    }

    /// Wakes an idle stepper. A full channel already guarantees a wake-up.
    pub fn wake(&self) -> bool {
        match self.commands.try_send(StepperCommand::Wake) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// True while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Latest tick statistics.
    #[must_use]
    pub fn stats(&self) -> TickStats {
        *self.stats.lock()
    }

    /// Stops the loop and joins the thread.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        let _ = self.commands.try_send(StepperCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("physics stepper panicked");
            }
        }
    }
}

impl Drop for StepperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_ready(stepper: &StepperHandle) -> Result<(), String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = stepper.poll_ready() {
                return result;
            }
            assert!(Instant::now() < deadline, "stepper never became ready");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_stepper_publishes_and_stops() {
        let region = SharedRegion::new();
        let mut stepper = StepperHandle::spawn(
            &region,
            BlackHoleConfig::schwarzschild(),
            EngineSettings::default(),
            StepperSettings::default(),
        )
        .expect("spawn");

        assert_eq!(wait_ready(&stepper), Ok(()));
        assert!(region.has_writer());
        assert!(region.telemetry().alive);
        assert!(region.sequence() >= 2);

        thread::sleep(Duration::from_millis(50));
        assert!(region.telemetry().tick_count > 0);

        stepper.shutdown();
        assert!(!stepper.is_running());
        assert!(!region.telemetry().alive);
        assert!(!region.has_writer());
        assert_eq!(region.sequence() % 2, 0);
    }

    #[test]
    fn test_second_stepper_is_refused() {
        let region = SharedRegion::new();
        let _first = StepperHandle::spawn(
            &region,
            BlackHoleConfig::schwarzschild(),
            EngineSettings::default(),
            StepperSettings::default(),
        )
        .expect("spawn");
        let second = StepperHandle::spawn(
            &region,
            BlackHoleConfig::schwarzschild(),
            EngineSettings::default(),
            StepperSettings::default(),
        );
        assert!(matches!(second, Err(EngineError::StepperSpawn(_))));
    }

    #[test]
    fn test_bad_settings_report_init_failure() {
        let region = SharedRegion::new();
        let settings = EngineSettings {
            max_step_seconds: -1.0,
            ..EngineSettings::default()
        };
        let stepper = StepperHandle::spawn(
            &region,
            BlackHoleConfig::schwarzschild(),
            settings,
            StepperSettings::default(),
        )
        .expect("spawn");
        assert!(wait_ready(&stepper).is_err());
    }

    #[test]
    fn test_configure_is_mirrored() {
        let region = SharedRegion::new();
        let stepper = StepperHandle::spawn(
            &region,
            BlackHoleConfig::schwarzschild(),
            EngineSettings::default(),
            StepperSettings::default(),
        )
        .expect("spawn");
        assert_eq!(wait_ready(&stepper), Ok(()));

        let config = BlackHoleConfig::new(3.0, -0.5).expect("valid");
        assert!(stepper.configure(config));

        let reader = region.reader();
        let deadline = Instant::now() + Duration::from_secs(5);
        while reader.mirrored_config().2 == 0 {
            assert!(Instant::now() < deadline, "configuration never mirrored");
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(reader.mirrored_config(), (3.0, -0.5, 1));
    }
}
