//! # Preset Benchmark
//!
//! Runs every preset for a fixed window and recommends the best one that
//! holds the target frame rate.
//!
//! ```text
//! start(current) ──► Apply(Ultra) ──► warmup 1 s ──► sample 10 s ──► stats
//!                    Apply(High)  ──► warmup 1 s ──► sample 10 s ──► stats
//!                    ...
//!                    Finished(report)
//!
//! cancel() ──► returns exactly the settings captured by start()
//! ```
//!
//! Windows are measured in accumulated frame time, so the controller is
//! driven entirely by `record_frame` and needs no clock.

use serde::{Deserialize, Serialize};

use crate::error::{PerfError, PerfResult};
use crate::quality::{QualityPreset, QualitySettings};

/// Benchmark timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSettings {
    /// Sampling window per preset, seconds.
    pub sample_seconds: f64,
    /// Discarded settling time after each preset switch, seconds.
    pub warmup_seconds: f64,
    /// Average FPS a preset must reach to be recommended.
    pub target_fps: f64,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            sample_seconds: 10.0,
            warmup_seconds: 1.0,
            target_fps: 60.0,
        }
    }
}

impl BenchmarkSettings {
    /// Checks ranges.
    ///
    /// # Errors
    ///
    /// [`PerfError::InvalidControllerConfig`] naming the bad field.
    pub fn validate(&self) -> PerfResult<()> {
        if !(self.sample_seconds.is_finite() && self.sample_seconds > 0.0) {
            return Err(PerfError::InvalidControllerConfig(format!(
                "benchmark.sample_seconds must be positive, got {}",
                self.sample_seconds
            )));
        }
        if !(self.warmup_seconds.is_finite() && self.warmup_seconds >= 0.0) {
            return Err(PerfError::InvalidControllerConfig(format!(
                "benchmark.warmup_seconds must be non-negative, got {}",
                self.warmup_seconds
            )));
        }
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(PerfError::InvalidControllerConfig(format!(
                "benchmark.target_fps must be positive, got {}",
                self.target_fps
            )));
        }
        Ok(())
    }
}

/// Statistics for one preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetStats {
    /// Preset measured.
    pub preset: QualityPreset,
    /// `1000 / mean frame time`.
    pub average_fps: f64,
    /// FPS of the slowest frame.
    pub min_fps: f64,
    /// FPS of the fastest frame.
    pub max_fps: f64,
    /// Mean frame time, ms.
    pub average_frame_time_ms: f64,
    /// Frames sampled.
    pub samples: usize,
}

impl PresetStats {
    /// Computes stats from frame times (ms). `None` when empty.
    #[must_use]
    pub fn from_frame_times(preset: QualityPreset, frame_times_ms: &[f64]) -> Option<Self> {
        if frame_times_ms.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = frame_times_ms.iter().sum::<f64>() / frame_times_ms.len() as f64;
        let slowest = frame_times_ms.iter().copied().fold(f64::MIN, f64::max);
        let fastest = frame_times_ms.iter().copied().fold(f64::MAX, f64::min);
        Some(Self {
            preset,
            average_fps: 1000.0 / mean,
            min_fps: 1000.0 / slowest,
            max_fps: 1000.0 / fastest,
            average_frame_time_ms: mean,
            samples: frame_times_ms.len(),
        })
    }
}

/// Outcome of a full session.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    /// Per-preset results, in run order.
    pub results: Vec<PresetStats>,
    /// Highest-quality preset meeting the target.
    pub recommended_preset: QualityPreset,
}

/// Recommends the first preset (in quality order) whose average FPS meets
/// `target_fps`; otherwise the lowest-quality preset measured, or
/// `MaxPerformance` when nothing was measured.
#[must_use]
pub fn recommend(results: &[PresetStats], target_fps: f64) -> QualityPreset {
    let mut ordered: Vec<&PresetStats> = results.iter().collect();
    ordered.sort_by_key(|s| s.preset);
    ordered
        .iter()
        .find(|s| s.average_fps >= target_fps)
        .or_else(|| ordered.last())
        .map_or(QualityPreset::MaxPerformance, |s| s.preset)
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkPhase {
    /// No session.
    Idle,
    /// Settling after a preset switch.
    Warmup,
    /// Collecting frame times.
    Sampling,
}

/// What the caller must do after a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkStep {
    /// No session active.
    Idle,
    /// Keep rendering with the current preset.
    Running {
        /// Preset under test.
        preset: QualityPreset,
        /// Whole-session progress in `[0, 1]`.
        progress: f64,
    },
    /// Switch to these settings now.
    Apply(QualitySettings),
    /// Session complete.
    Finished(BenchmarkReport),
}

/// Sequential preset benchmark.
#[derive(Debug, Clone)]
pub struct BenchmarkController {
    settings: BenchmarkSettings,
    queue: Vec<QualityPreset>,
    index: usize,
    phase: BenchmarkPhase,
    phase_elapsed: f64,
    frame_times: Vec<f64>,
    results: Vec<PresetStats>,
    saved: Option<QualitySettings>,
    last_report: Option<BenchmarkReport>,
}

impl BenchmarkController {
    /// Benchmarks every preset, highest quality first.
    ///
    /// # Errors
    ///
    /// [`PerfError::InvalidControllerConfig`] when the settings are invalid.
    pub fn new(settings: BenchmarkSettings) -> PerfResult<Self> {
        Self::with_queue(settings, QualityPreset::ALL.to_vec())
    }

    /// Benchmarks `queue` in order.
    ///
    /// # Errors
    ///
    /// [`PerfError::EmptyPresetQueue`] or [`PerfError::InvalidControllerConfig`].
    pub fn with_queue(settings: BenchmarkSettings, queue: Vec<QualityPreset>) -> PerfResult<Self> {
        settings.validate()?;
        if queue.is_empty() {
            return Err(PerfError::EmptyPresetQueue);
        }
        Ok(Self {
            settings,
            queue,
            index: 0,
            phase: BenchmarkPhase::Idle,
            phase_elapsed: 0.0,
            frame_times: Vec::new(),
            results: Vec::new(),
            saved: None,
            last_report: None,
        })
    }

    /// Starts a session. Captures `current` for `cancel()` and returns the
    /// first preset's settings to apply.
    ///
    /// # Errors
    ///
    /// [`PerfError::BenchmarkAlreadyRunning`] during a session.
    pub fn start(&mut self, current: QualitySettings) -> PerfResult<QualitySettings> {
        if self.is_running() {
            return Err(PerfError::BenchmarkAlreadyRunning);
        }
        self.saved = Some(current);
        self.results.clear();
        self.index = 0;
        self.enter_preset();
        tracing::info!(presets = self.queue.len(), "benchmark started");
        Ok(self.queue[0].settings())
    }

    fn enter_preset(&mut self) {
        self.phase = if self.settings.warmup_seconds > 0.0 {
            BenchmarkPhase::Warmup
        } else {
            BenchmarkPhase::Sampling
        };
        self.phase_elapsed = 0.0;
        self.frame_times.clear();
    }

    /// Feeds one rendered frame.
    pub fn record_frame(&mut self, frame_time_ms: f64) -> BenchmarkStep {
        if !self.is_running() {
            return BenchmarkStep::Idle;
        }
        let preset = self.queue[self.index];
        if !(frame_time_ms.is_finite() && frame_time_ms > 0.0) {
            return BenchmarkStep::Running {
                preset,
                progress: self.progress(),
            };
        }
        self.phase_elapsed += frame_time_ms / 1000.0;

        match self.phase {
            BenchmarkPhase::Warmup => {
                if self.phase_elapsed >= self.settings.warmup_seconds {
                    self.phase = BenchmarkPhase::Sampling;
                    self.phase_elapsed = 0.0;
                }
            }
            BenchmarkPhase::Sampling => {
                self.frame_times.push(frame_time_ms);
                if self.phase_elapsed >= self.settings.sample_seconds {
                    return self.finish_preset(preset);
                }
            }
            BenchmarkPhase::Idle => return BenchmarkStep::Idle,
        }
        BenchmarkStep::Running {
            preset,
            progress: self.progress(),
        }
    }

    fn finish_preset(&mut self, preset: QualityPreset) -> BenchmarkStep {
        if let Some(stats) = PresetStats::from_frame_times(preset, &self.frame_times) {
            tracing::debug!(%preset, average_fps = stats.average_fps, "benchmark preset measured");
            self.results.push(stats);
        }
        self.index += 1;
        if let Some(next) = self.queue.get(self.index).copied() {
            self.enter_preset();
            return BenchmarkStep::Apply(next.settings());
        }

        let recommended_preset = recommend(&self.results, self.settings.target_fps);
        if self.results.iter().all(|s| s.average_fps < self.settings.target_fps) {
            tracing::warn!(%recommended_preset, "no preset reached the target frame rate");
        }
        let report = BenchmarkReport {
            results: std::mem::take(&mut self.results),
            recommended_preset,
        };
        tracing::info!(%recommended_preset, "benchmark finished");
        self.reset_session();
        self.last_report = Some(report.clone());
        BenchmarkStep::Finished(report)
    }

    /// Aborts the session and returns the settings captured at `start()`.
    ///
    /// # Errors
    ///
    /// [`PerfError::BenchmarkNotRunning`] without a session.
    pub fn cancel(&mut self) -> PerfResult<QualitySettings> {
        let saved = self.saved.ok_or(PerfError::BenchmarkNotRunning)?;
        self.reset_session();
        self.results.clear();
        tracing::info!("benchmark cancelled");
        Ok(saved)
    }

    fn reset_session(&mut self) {
        self.saved = None;
        self.phase = BenchmarkPhase::Idle;
        self.phase_elapsed = 0.0;
        self.index = 0;
        self.frame_times.clear();
    }

    /// True during a session.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.saved.is_some()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> BenchmarkPhase {
        self.phase
    }

    /// Preset under test.
    #[must_use]
    pub fn current_preset(&self) -> Option<QualityPreset> {
        self.is_running().then(|| self.queue[self.index])
    }

    /// Whole-session progress in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if !self.is_running() {
            return 0.0;
        }
        let per_preset = self.settings.warmup_seconds + self.settings.sample_seconds;
        let done = match self.phase {
            BenchmarkPhase::Warmup => self.phase_elapsed,
            BenchmarkPhase::Sampling => self.settings.warmup_seconds + self.phase_elapsed,
            BenchmarkPhase::Idle => 0.0,
        };
        ((self.index as f64 * per_preset + done) / (self.queue.len() as f64 * per_preset)).clamp(0.0, 1.0)
    }

    /// Results collected so far in this session.
    #[must_use]
    pub fn partial_results(&self) -> &[PresetStats] {
        &self.results
    }

    /// Report of the last completed session.
    #[must_use]
    pub fn last_report(&self) -> Option<&BenchmarkReport> {
        self.last_report.as_ref()
    }

    /// Benchmark timing.
    #[must_use]
    pub fn settings(&self) -> &BenchmarkSettings {
        &self.settings
    }
}
