//! # Adaptive Resolution Controller
//!
//! PID law from rolling-FPS error to render resolution scale.
//!
//! ```text
//! error = target − rolling
//!   │
//!   ├─ |error| < deadzone ───────────────► hold
//!   │
//!   ├─ integral = clamp(integral + error, ±limit)
//!   ├─ derivative = error − previous
//!   │
//!   ├─ Δ = kp·error + ki·integral + kd·derivative
//!   ├─ cooldown not elapsed ─────────────► hold
//!   └─ scale = clamp(scale − Δ, min, max[device])
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{PerfError, PerfResult};

/// Hardware class; mobile caps the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceClass {
    /// Desktop GPU.
    #[default]
    Desktop,
    /// Mobile / integrated GPU.
    Mobile,
}

/// Controller gains and limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveSettings {
    /// Frame rate to hold.
    pub target_fps: f64,
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
    /// Errors smaller than `deadzone_fraction × target_fps` are ignored.
    pub deadzone_fraction: f64,
    /// Bound on the accumulated error.
    pub integral_limit: f64,
    /// Minimum time between scale changes, ms.
    pub cooldown_ms: u64,
    /// Lowest scale.
    pub min_scale: f64,
    /// Highest scale.
    pub max_scale: f64,
    /// Highest scale on mobile hardware.
    pub mobile_max_scale: f64,
    /// Changes smaller than this are skipped unless they reach a bound.
    pub min_step: f64,
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            kp: 0.004,
            ki: 0.0005,
            kd: 0.001,
            deadzone_fraction: 0.05,
            integral_limit: 50.0,
            cooldown_ms: 500,
            min_scale: 0.5,
            max_scale: 1.0,
            mobile_max_scale: 0.75,
            min_step: 0.02,
        }
    }
}

impl AdaptiveSettings {
    /// Checks ranges.
    ///
    /// # Errors
    ///
    /// [`PerfError::InvalidControllerConfig`] naming the bad field.
    pub fn validate(&self) -> PerfResult<()> {
        let bad = |msg: String| Err(PerfError::InvalidControllerConfig(msg));
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return bad(format!("adaptive.target_fps must be positive, got {}", self.target_fps));
        }
        for (name, value) in [
            ("adaptive.kp", self.kp),
            ("adaptive.ki", self.ki),
            ("adaptive.kd", self.kd),
            ("adaptive.deadzone_fraction", self.deadzone_fraction),
            ("adaptive.integral_limit", self.integral_limit),
            ("adaptive.min_step", self.min_step),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return bad(format!("{name} must be non-negative, got {value}"));
            }
        }
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale && self.max_scale <= 1.0) {
            return bad(format!(
                "adaptive scale range must satisfy 0 < min ≤ max ≤ 1, got {}..{}",
                self.min_scale, self.max_scale
            ));
        }
        if !(self.mobile_max_scale >= self.min_scale && self.mobile_max_scale <= 1.0) {
            return bad(format!(
                "adaptive.mobile_max_scale must lie in [min_scale, 1], got {}",
                self.mobile_max_scale
            ));
        }
        Ok(())
    }
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionState {
    /// Current scale.
    pub scale: f64,
    /// Accumulated error.
    pub integral_error: f64,
    /// When the scale last changed.
    pub last_change: Option<Instant>,
}

/// PID resolution controller.
#[derive(Debug, Clone)]
pub struct AdaptiveResolution {
    settings: AdaptiveSettings,
    device: DeviceClass,
    state: ResolutionState,
    previous_error: Option<f64>,
    enabled: bool,
}

impl AdaptiveResolution {
    /// Starts at the device's maximum scale.
    ///
    /// # Errors
    ///
    /// [`PerfError::InvalidControllerConfig`] when the settings are invalid.
    pub fn new(settings: AdaptiveSettings, device: DeviceClass) -> PerfResult<Self> {
        settings.validate()?;
        let mut controller = Self {
            settings,
            device,
            state: ResolutionState {
                scale: 1.0,
                integral_error: 0.0,
                last_change: None,
            },
            previous_error: None,
            enabled: true,
        };
        controller.state.scale = controller.max_scale();
        Ok(controller)
    }

    /// Upper bound for this device.
    #[must_use]
    pub fn max_scale(&self) -> f64 {
        match self.device {
            DeviceClass::Desktop => self.settings.max_scale,
            DeviceClass::Mobile => self.settings.max_scale.min(self.settings.mobile_max_scale),
        }
    }

    /// Feeds one rolling-FPS observation. Returns the new scale when it
    /// changed.
    pub fn update(&mut self, rolling_fps: f64, now: Instant) -> Option<f64> {
        if !self.enabled || !rolling_fps.is_finite() {
            return None;
        }
        let s = &self.settings;
        let error = s.target_fps - rolling_fps;
        let previous = self.previous_error.replace(error);

        if error.abs() < s.deadzone_fraction * s.target_fps {
            return None;
        }

        let limit = s.integral_limit;
        self.state.integral_error = (self.state.integral_error + error).clamp(-limit, limit);
        let derivative = previous.map_or(0.0, |p| error - p);
        let delta = s.kp * error + s.ki * self.state.integral_error + s.kd * derivative;

        let cooling = self
            .state
            .last_change
            .is_some_and(|at| now.saturating_duration_since(at) < Duration::from_millis(s.cooldown_ms));
        if cooling {
            return None;
        }

        let (min, max) = (s.min_scale, self.max_scale());
        let current = self.state.scale;
        let next = (current - delta).clamp(min, max);
        let at_bound = next == min || next == max;
        if next == current || ((next - current).abs() < s.min_step && !at_bound) {
            return None;
        }

        self.state.scale = next;
        self.state.last_change = Some(now);
        tracing::debug!(from = current, to = next, error, "resolution scale changed");
        Some(next)
    }

    /// Current scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    /// Controller state.
    #[must_use]
    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    /// Hardware class.
    #[must_use]
    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Whether updates are applied.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the controller. Disabling resets the state.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    /// Restores the maximum scale and clears accumulated error.
    pub fn reset(&mut self) {
        self.state = ResolutionState {
            scale: self.max_scale(),
            integral_error: 0.0,
            last_change: None,
        };
        self.previous_error = None;
    }

    /// Sets the scale directly (preset change), clamped to the device range.
    pub fn set_scale(&mut self, scale: f64) {
        self.state.scale = scale.clamp(self.settings.min_scale, self.max_scale());
        self.state.integral_error = 0.0;
        self.previous_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(device: DeviceClass) -> AdaptiveResolution {
        AdaptiveResolution::new(AdaptiveSettings::default(), device).expect("defaults are valid")
    }

    #[test]
    fn test_starts_at_device_max() {
        assert_eq!(controller(DeviceClass::Desktop).scale(), 1.0);
        assert_eq!(controller(DeviceClass::Mobile).scale(), 0.75);
    }

    #[test]
    fn test_deadzone_holds() {
        let mut c = controller(DeviceClass::Desktop);
        let now = Instant::now();
        assert_eq!(c.update(58.0, now), None);
        assert_eq!(c.update(62.0, now + Duration::from_secs(1)), None);
        assert_eq!(c.state().integral_error, 0.0);
    }

    #[test]
    fn test_low_fps_reduces_scale() {
        let mut c = controller(DeviceClass::Desktop);
        let now = Instant::now();
        let scale = c.update(40.0, now).expect("scale change");
        // kp·20 + ki·20 = 0.09
        assert!((scale - 0.91).abs() < 1e-12);
    }

    #[test]
    fn test_cooldown_limits_change_rate() {
        let mut c = controller(DeviceClass::Desktop);
        let t0 = Instant::now();
        assert!(c.update(30.0, t0).is_some());
        assert!(c.update(30.0, t0 + Duration::from_millis(100)).is_none());
        assert!(c.update(30.0, t0 + Duration::from_millis(600)).is_some());
    }

    #[test]
    fn test_scale_bounded_and_integral_clamped() {
        let mut c = controller(DeviceClass::Desktop);
        let mut t = Instant::now();
        for _ in 0..200 {
            c.update(5.0, t);
            t += Duration::from_secs(1);
        }
        assert_eq!(c.scale(), 0.5);
        assert_eq!(c.state().integral_error, 50.0);

        for _ in 0..400 {
            c.update(200.0, t);
            t += Duration::from_secs(1);
        }
        assert_eq!(c.scale(), 1.0);
        assert_eq!(c.state().integral_error, -50.0);
    }

    #[test]
    fn test_mobile_cap() {
        let mut c = controller(DeviceClass::Mobile);
        let mut t = Instant::now();
        for _ in 0..100 {
            c.update(240.0, t);
            t += Duration::from_secs(1);
        }
        assert_eq!(c.scale(), 0.75);
    }

    #[test]
    fn test_disabled_controller_ignores_input() {
        let mut c = controller(DeviceClass::Desktop);
        c.set_enabled(false);
        assert_eq!(c.update(10.0, Instant::now()), None);
        assert_eq!(c.scale(), 1.0);
    }

    #[test]
    fn test_invalid_settings() {
        let inverted = AdaptiveSettings {
            min_scale: 0.9,
            max_scale: 0.6,
            ..AdaptiveSettings::default()
        };
        assert!(AdaptiveResolution::new(inverted, DeviceClass::Desktop).is_err());
        let negative = AdaptiveSettings {
            kp: -1.0,
            ..AdaptiveSettings::default()
        };
        assert!(negative.validate().is_err());
    }
}
