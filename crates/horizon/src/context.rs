//! # Simulation Context
//!
//! One physics session plus the perf controllers, owned by the caller and
//! injected wherever it is needed. No process-wide state.
//!
//! ```text
//!   UiCommand ──► handle() ──► PhysicsBridge (configure / orbit)
//!                         └──► QualitySettings / BenchmarkController
//!
//!   frame(dt_ms)
//!     ├─ bridge.tick()            → FrameSnapshot
//!     ├─ monitor.update_metrics() → rolling FPS
//!     ├─ benchmark.record_frame() → Apply / Finished   (while running)
//!     └─ adaptive.update()        → resolution scale   (otherwise)
//! ```

use std::time::Instant;

use tracing::{debug, info};

use horizon_engine::{BridgeState, BridgeStats, Capabilities, FrameSnapshot, PhysicsBridge};
use horizon_perf::{
    AdaptiveResolution, BenchmarkController, BenchmarkReport, BenchmarkStep, DeviceClass,
    PerformanceMetrics, PerformanceMonitor, QualityPreset, QualitySettings,
};
use horizon_physics::BlackHoleConfig;

use crate::config::HorizonConfig;
use crate::error::HorizonResult;
use crate::preferences::Preferences;

/// Commands from the front end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiCommand {
    /// Change mass / spin. Invalid values are rejected.
    Configure {
        /// Solar masses.
        mass: f64,
        /// Dimensionless spin.
        spin: f64,
    },
    /// Orbit / zoom deltas from pointer or touch input.
    Orbit {
        /// Azimuthal delta, radians.
        dtheta: f64,
        /// Polar delta, radians.
        dphi: f64,
        /// Log-distance delta; positive moves outward.
        dzoom: f64,
    },
    /// Switch preset. Refused while a benchmark runs.
    SelectPreset(QualityPreset),
    /// Toggle the adaptive resolution controller.
    SetAdaptive(bool),
    /// Start a preset benchmark.
    StartBenchmark,
    /// Abort the benchmark and restore the previous settings.
    CancelBenchmark,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Physics state to draw.
    pub snapshot: FrameSnapshot,
    /// Monitor readout.
    pub metrics: PerformanceMetrics,
    /// Render scale to use this frame.
    pub resolution_scale: f32,
    /// Active renderer settings.
    pub settings: QualitySettings,
    /// Benchmark progress, `None` when no session ran this frame.
    pub benchmark: Option<BenchmarkStep>,
}

/// A running simulation session.
pub struct SimulationContext {
    bridge: PhysicsBridge,
    monitor: PerformanceMonitor,
    adaptive: AdaptiveResolution,
    benchmark: BenchmarkController,
    settings: QualitySettings,
    resume_adaptive: bool,
    last_report: Option<BenchmarkReport>,
}

impl SimulationContext {
    /// Builds a session from configuration and stored preferences.
    ///
    /// The stored preferences win over `[black_hole]` and
    /// `[render].initial_preset`; pass `None` for a first run.
    ///
    /// # Errors
    ///
    /// Configuration errors, or [`crate::HorizonError::Engine`] when no
    /// physics engine can be built at all.
    pub fn new(
        config: &HorizonConfig,
        preferences: Option<&Preferences>,
        capabilities: Capabilities,
    ) -> HorizonResult<Self> {
        config.validate()?;

        let (black_hole, settings) = match preferences {
            Some(prefs) => (prefs.black_hole(), prefs.quality_settings()),
            None => (
                config.black_hole_config()?,
                config.render.initial_preset.settings(),
            ),
        };

        let mut bridge = PhysicsBridge::new(black_hole, config.bridge_options(), capabilities);
        let state = bridge.ensure_initialized()?;

        info!(
            mass = black_hole.mass(),
            spin = black_hole.spin(),
            preset = %settings.preset,
            %state,
            "Simulation context created"
        );

        let mut context = Self {
            bridge,
            monitor: PerformanceMonitor::new(config.monitor)?,
            adaptive: AdaptiveResolution::new(config.adaptive, config.render.device)?,
            benchmark: BenchmarkController::new(config.benchmark)?,
            settings,
            resume_adaptive: settings.adaptive_resolution,
            last_report: None,
        };
        context.apply(settings);
        Ok(context)
    }

    /// Applies one front-end command.
    ///
    /// # Errors
    ///
    /// [`crate::HorizonError::Config`] for invalid mass / spin,
    /// [`crate::HorizonError::Perf`] for benchmark misuse, or
    /// [`crate::HorizonError::Engine`] after shutdown.
    pub fn handle(&mut self, command: UiCommand) -> HorizonResult<()> {
        match command {
            UiCommand::Configure { mass, spin } => {
                let config = BlackHoleConfig::new(mass, spin)?;
                self.bridge.configure(config)?;
            }
            UiCommand::Orbit { dtheta, dphi, dzoom } => self.bridge.orbit(dtheta, dphi, dzoom),
            UiCommand::SelectPreset(preset) => {
                if self.benchmark.is_running() {
                    return Err(horizon_perf::PerfError::BenchmarkAlreadyRunning.into());
                }
                let adaptive = self.settings.adaptive_resolution;
                self.apply(QualitySettings {
                    adaptive_resolution: adaptive,
                    ..preset.settings()
                });
            }
            UiCommand::SetAdaptive(enabled) => {
                self.resume_adaptive = enabled;
                if !self.benchmark.is_running() {
                    let resolution_scale = if enabled {
                        self.settings.resolution_scale
                    } else {
                        self.settings.preset.settings().resolution_scale
                    };
                    self.apply(QualitySettings {
                        adaptive_resolution: enabled,
                        resolution_scale,
                        ..self.settings
                    });
                }
            }
            UiCommand::StartBenchmark => {
                let first = self.benchmark.start(self.settings)?;
                self.resume_adaptive = self.settings.adaptive_resolution;
                self.adaptive.set_enabled(false);
                self.apply_for_benchmark(first);
                self.monitor.reset();
            }
            UiCommand::CancelBenchmark => {
                let saved = self.benchmark.cancel()?;
                self.apply(QualitySettings {
                    adaptive_resolution: self.resume_adaptive,
                    ..saved
                });
                self.monitor.reset();
            }
        }
        Ok(())
    }

    /// Advances one render frame measured at `frame_time_ms`.
    pub fn frame(&mut self, frame_time_ms: f64) -> FrameOutput {
        self.frame_at(frame_time_ms, Instant::now())
    }

    /// [`frame`](Self::frame) with an explicit clock for the resolution
    /// controller's cooldown.
    pub fn frame_at(&mut self, frame_time_ms: f64, now: Instant) -> FrameOutput {
        let snapshot = *self.bridge.tick(frame_time_ms / 1_000.0);
        self.monitor.update_metrics(frame_time_ms);

        let benchmark = if self.benchmark.is_running() {
            let step = self.benchmark.record_frame(frame_time_ms);
            match &step {
                BenchmarkStep::Apply(next) => {
                    self.apply_for_benchmark(*next);
                    self.monitor.reset();
                }
                BenchmarkStep::Finished(report) => self.finish_benchmark(report.clone()),
                BenchmarkStep::Idle | BenchmarkStep::Running { .. } => {}
            }
            Some(step)
        } else {
            if self.settings.adaptive_resolution {
                let rolling = f64::from(self.monitor.rolling_average_fps());
                if let Some(scale) = self.adaptive.update(rolling, now) {
                    #[allow(clippy::cast_possible_truncation)]
                    let scale = scale as f32;
                    self.settings.resolution_scale = scale;
                }
            }
            None
        };

        FrameOutput {
            snapshot,
            metrics: self.monitor.metrics(self.settings.preset, self.settings.resolution_scale),
            resolution_scale: self.settings.resolution_scale,
            settings: self.settings,
            benchmark,
        }
    }

    /// The disk colour LUT, once the engine has published one.
    pub fn lut(&mut self) -> Option<&[f32]> {
        self.bridge.lut()
    }

    /// Active renderer settings.
    #[must_use]
    pub fn settings(&self) -> &QualitySettings {
        &self.settings
    }

    /// Current black hole configuration.
    #[must_use]
    pub fn black_hole(&self) -> BlackHoleConfig {
        self.bridge.config()
    }

    /// Preferences to persist for the next session.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        Preferences::from_settings(&self.settings, &self.bridge.config())
    }

    /// Most recent completed benchmark.
    #[must_use]
    pub fn last_report(&self) -> Option<&BenchmarkReport> {
        self.last_report.as_ref()
    }

    /// Benchmark session progress in `[0, 1]`.
    #[must_use]
    pub fn benchmark_progress(&self) -> Option<f64> {
        self.benchmark.is_running().then(|| self.benchmark.progress())
    }

    /// Bridge lifecycle state.
    #[must_use]
    pub fn bridge_state(&self) -> BridgeState {
        self.bridge.state()
    }

    /// True when a stepper thread feeds the region.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.bridge.is_shared()
    }

    /// Bridge read-path counters.
    #[must_use]
    pub fn bridge_stats(&self) -> BridgeStats {
        self.bridge.stats()
    }

    /// Frame-time monitor.
    #[must_use]
    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    /// Resolution controller.
    #[must_use]
    pub fn adaptive(&self) -> &AdaptiveResolution {
        &self.adaptive
    }

    /// Device class the resolution cap follows.
    #[must_use]
    pub fn device(&self) -> DeviceClass {
        self.adaptive.device()
    }

    /// Stops the stepper. Idempotent.
    pub fn shutdown(&mut self) {
        self.bridge.shutdown();
    }

    fn apply(&mut self, settings: QualitySettings) {
        debug!(preset = %settings.preset, scale = settings.resolution_scale, "Quality settings applied");
        self.settings = settings;
        self.adaptive.set_enabled(settings.adaptive_resolution);
        self.adaptive.set_scale(f64::from(settings.resolution_scale));
        self.settings.resolution_scale = self.adaptive_scale_or(settings.resolution_scale);
    }

    // Benchmark runs measure presets as shipped; the controller stays off.
    fn apply_for_benchmark(&mut self, settings: QualitySettings) {
        debug!(preset = %settings.preset, "Benchmarking preset");
        self.settings = QualitySettings {
            adaptive_resolution: false,
            resolution_scale: self.capped(settings.resolution_scale),
            ..settings
        };
    }

    fn finish_benchmark(&mut self, report: BenchmarkReport) {
        let preset = report.recommended_preset;
        info!(recommended = %preset, presets = report.results.len(), "Benchmark complete");
        self.apply(QualitySettings {
            adaptive_resolution: self.resume_adaptive,
            ..preset.settings()
        });
        self.last_report = Some(report);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn adaptive_scale_or(&self, fallback: f32) -> f32 {
        if self.adaptive.is_enabled() {
            self.adaptive.scale() as f32
        } else {
            self.capped(fallback)
        }
    }

    // Device cap holds whether or not the controller runs.
    #[allow(clippy::cast_possible_truncation)]
    fn capped(&self, scale: f32) -> f32 {
        scale.min(self.adaptive.max_scale() as f32)
    }
}

impl Drop for SimulationContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
