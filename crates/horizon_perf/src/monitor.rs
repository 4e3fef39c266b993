//! # Performance Monitor
//!
//! Rolling window of frame times.
//!
//! ```text
//! update_metrics(ft) ──► [ft₀ … ft₅₉] (oldest evicted)
//!                            │
//!                            ├─► current FPS  = round(1000 / ft)
//!                            └─► rolling FPS  = round(1000 / mean(window))
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{PerfError, PerfResult};
use crate::quality::QualityPreset;

/// Monitor thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Samples in the rolling window.
    pub window: usize,
    /// Frame rate the budget is derived from.
    pub target_fps: f64,
    /// Below this rolling FPS quality should drop.
    pub adaptive_threshold: f64,
    /// Above this rolling FPS quality may rise.
    pub recovery_threshold: f64,
    /// A frame longer than this many budgets is a spike.
    pub spike_factor: f64,
    /// Rolling FPS below this is critical.
    pub critical_fps: f64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            window: 60,
            target_fps: 60.0,
            adaptive_threshold: 45.0,
            recovery_threshold: 58.0,
            spike_factor: 2.0,
            critical_fps: 30.0,
        }
    }
}

impl MonitorSettings {
    /// Checks ranges.
    ///
    /// # Errors
    ///
    /// [`PerfError::InvalidControllerConfig`] naming the bad field.
    pub fn validate(&self) -> PerfResult<()> {
        if self.window == 0 {
            return Err(PerfError::InvalidControllerConfig("monitor.window must be at least 1".into()));
        }
        for (name, value) in [
            ("monitor.target_fps", self.target_fps),
            ("monitor.adaptive_threshold", self.adaptive_threshold),
            ("monitor.recovery_threshold", self.recovery_threshold),
            ("monitor.spike_factor", self.spike_factor),
            ("monitor.critical_fps", self.critical_fps),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PerfError::InvalidControllerConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.adaptive_threshold > self.recovery_threshold {
            return Err(PerfError::InvalidControllerConfig(format!(
                "monitor.adaptive_threshold ({}) exceeds recovery_threshold ({})",
                self.adaptive_threshold, self.recovery_threshold
            )));
        }
        Ok(())
    }

    /// Frame budget in milliseconds.
    #[must_use]
    pub fn target_frame_time_ms(&self) -> f64 {
        1000.0 / self.target_fps
    }
}

/// Frame-timing health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerformanceWarning {
    /// Within budget.
    #[default]
    None,
    /// The last frame took more than `spike_factor` budgets.
    FrameSpike,
    /// Rolling FPS below the adaptive threshold.
    BelowTarget,
    /// Rolling FPS below the critical floor.
    Critical,
}

/// Outbound per-frame metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceMetrics {
    /// `round(1000 / frame_time_ms)`.
    pub current_fps: u32,
    /// Last frame time.
    pub frame_time_ms: f64,
    /// `round(1000 / mean(window))`.
    pub rolling_average_fps: u32,
    /// Active preset.
    pub quality: QualityPreset,
    /// Active render resolution scale.
    pub render_resolution: f32,
    /// Budget usage, percent.
    pub budget_usage: f64,
    /// Health classification.
    pub warning: PerformanceWarning,
}

/// Rolling frame-time monitor.
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    settings: MonitorSettings,
    samples: VecDeque<f64>,
    frame_time_ms: f64,
    current_fps: u32,
    rolling_average_fps: u32,
    frames: u64,
    rejected: u64,
}

impl PerformanceMonitor {
    /// Creates an empty monitor.
    ///
    /// # Errors
    ///
    /// [`PerfError::InvalidControllerConfig`] when the settings are invalid.
    pub fn new(settings: MonitorSettings) -> PerfResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            samples: VecDeque::with_capacity(settings.window),
            frame_time_ms: 0.0,
            current_fps: 0,
            rolling_average_fps: 0,
            frames: 0,
            rejected: 0,
        })
    }

    /// Records one frame. Non-finite or non-positive frame times are
    /// ignored; returns false for those.
    pub fn update_metrics(&mut self, frame_time_ms: f64) -> bool {
        if !(frame_time_ms.is_finite() && frame_time_ms > 0.0) {
            self.rejected += 1;
            return false;
        }
        if self.samples.len() == self.settings.window {
            self.samples.pop_front();
        }
        self.samples.push_back(frame_time_ms);
        self.frames += 1;
        self.frame_time_ms = frame_time_ms;
        self.current_fps = fps_from_ms(frame_time_ms);

        #[allow(clippy::cast_precision_loss)]
        let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        self.rolling_average_fps = fps_from_ms(mean);
        true
    }

    /// `round(1000 / last frame time)`.
    #[must_use]
    pub fn current_fps(&self) -> u32 {
        self.current_fps
    }

    /// `round(1000 / mean(window))`.
    #[must_use]
    pub fn rolling_average_fps(&self) -> u32 {
        self.rolling_average_fps
    }

    /// Last accepted frame time.
    #[must_use]
    pub fn frame_time_ms(&self) -> f64 {
        self.frame_time_ms
    }

    /// Samples currently in the window.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Frames accepted since creation or reset.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frame times ignored as invalid.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Rolling FPS under the adaptive threshold.
    #[must_use]
    pub fn should_reduce_quality(&self) -> bool {
        !self.samples.is_empty() && f64::from(self.rolling_average_fps) < self.settings.adaptive_threshold
    }

    /// Rolling FPS above the recovery threshold.
    #[must_use]
    pub fn should_increase_quality(&self) -> bool {
        !self.samples.is_empty() && f64::from(self.rolling_average_fps) > self.settings.recovery_threshold
    }

    /// `actual / target × 100` for the last frame.
    #[must_use]
    pub fn frame_time_budget_usage(&self) -> f64 {
        self.frame_time_ms / self.settings.target_frame_time_ms() * 100.0
    }

    /// Classifies the current state.
    #[must_use]
    pub fn warning(&self) -> PerformanceWarning {
        if self.samples.is_empty() {
            return PerformanceWarning::None;
        }
        let rolling = f64::from(self.rolling_average_fps);
        if rolling < self.settings.critical_fps {
            PerformanceWarning::Critical
        } else if self.frame_time_ms > self.settings.spike_factor * self.settings.target_frame_time_ms() {
            PerformanceWarning::FrameSpike
        } else if rolling < self.settings.adaptive_threshold {
            PerformanceWarning::BelowTarget
        } else {
            PerformanceWarning::None
        }
    }

    /// Bundles the outbound metrics.
    #[must_use]
    pub fn metrics(&self, quality: QualityPreset, render_resolution: f32) -> PerformanceMetrics {
        PerformanceMetrics {
            current_fps: self.current_fps,
            frame_time_ms: self.frame_time_ms,
            rolling_average_fps: self.rolling_average_fps,
            quality,
            render_resolution,
            budget_usage: self.frame_time_budget_usage(),
            warning: self.warning(),
        }
    }

    /// Monitor thresholds.
    #[must_use]
    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Clears the window.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.frame_time_ms = 0.0;
        self.current_fps = 0;
        self.rolling_average_fps = 0;
        self.frames = 0;
        self.rejected = 0;
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fps_from_ms(frame_time_ms: f64) -> u32 {
    (1000.0 / frame_time_ms).round() as u32
}
