//! # HORIZON Configuration
//!
//! ```toml
//! [black_hole]
//! mass = 1.0
//! spin = 0.0
//!
//! [stepper]
//! tick_rate_hz = 120
//! idle_after_ms = 3000
//! idle_interval_ms = 1000
//! max_step_seconds = 0.033
//! threaded = true
//!
//! [monitor]
//! window = 60
//! target_fps = 60.0
//!
//! [adaptive]
//! kp = 0.004
//!
//! [benchmark]
//! sample_seconds = 10.0
//!
//! [render]
//! device = "desktop"
//! ```
//!
//! Every field is optional; an empty document yields the defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use horizon_engine::{BridgeOptions, EngineSettings, PacerSettings, StepperSettings};
use horizon_perf::{AdaptiveSettings, BenchmarkSettings, DeviceClass, MonitorSettings, QualityPreset};
use horizon_physics::BlackHoleConfig;

use crate::error::{HorizonError, HorizonResult};

/// `[black_hole]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlackHoleSection {
    /// Solar masses.
    pub mass: f64,
    /// Dimensionless spin.
    pub spin: f64,
}

impl Default for BlackHoleSection {
    fn default() -> Self {
        Self { mass: 1.0, spin: 0.0 }
    }
}

/// `[stepper]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepperSection {
    /// Active tick rate.
    pub tick_rate_hz: u32,
    /// Quiet period before throttling, ms.
    pub idle_after_ms: u64,
    /// Throttled tick interval, ms.
    pub idle_interval_ms: u64,
    /// Largest integration step, seconds.
    pub max_step_seconds: f64,
    /// Run the stepper on its own thread when possible.
    pub threaded: bool,
    /// Wait for stepper readiness before degrading, ms.
    pub ready_timeout_ms: u64,
}

impl Default for StepperSection {
    fn default() -> Self {
        Self {
            tick_rate_hz: 120,
            idle_after_ms: 3_000,
            idle_interval_ms: 1_000,
            max_step_seconds: 0.033,
            threaded: true,
            ready_timeout_ms: 2_000,
        }
    }
}

/// `[render]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    /// Hardware class for the resolution cap.
    pub device: DeviceClass,
    /// Preset used when no preference is stored.
    pub initial_preset: QualityPreset,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            device: DeviceClass::Desktop,
            initial_preset: QualityPreset::High,
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HorizonConfig {
    /// Initial mass / spin.
    pub black_hole: BlackHoleSection,
    /// Stepper pacing.
    pub stepper: StepperSection,
    /// Frame-time monitor.
    pub monitor: MonitorSettings,
    /// Resolution controller.
    pub adaptive: AdaptiveSettings,
    /// Preset benchmark.
    pub benchmark: BenchmarkSettings,
    /// Device and initial preset.
    pub render: RenderSection,
}

impl HorizonConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`HorizonError::ConfigParse`] on malformed TOML, or the validation
    /// error for out-of-range values.
    pub fn from_toml_str(text: &str) -> HorizonResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`HorizonError::Io`] when unreadable, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> HorizonResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// [`HorizonError::Serialize`] if a value cannot be represented.
    pub fn to_toml_string(&self) -> HorizonResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// The first failing section's error.
    pub fn validate(&self) -> HorizonResult<()> {
        self.black_hole_config()?;
        let s = &self.stepper;
        if s.tick_rate_hz == 0 {
            return Err(HorizonError::InvalidConfig("stepper.tick_rate_hz must be at least 1".into()));
        }
        if s.idle_interval_ms == 0 {
            return Err(HorizonError::InvalidConfig("stepper.idle_interval_ms must be at least 1".into()));
        }
        self.engine_settings().validate()?;
        self.monitor.validate()?;
        self.adaptive.validate()?;
        self.benchmark.validate()?;
        Ok(())
    }

    /// The validated initial configuration.
    ///
    /// # Errors
    ///
    /// [`HorizonError::Config`] when mass or spin is out of range.
    pub fn black_hole_config(&self) -> HorizonResult<BlackHoleConfig> {
        Ok(BlackHoleConfig::new(self.black_hole.mass, self.black_hole.spin)?)
    }

    /// Engine tunables derived from `[stepper]`.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_step_seconds: self.stepper.max_step_seconds,
            ..EngineSettings::default()
        }
    }

    /// Bridge options derived from `[stepper]`.
    #[must_use]
    pub fn bridge_options(&self) -> BridgeOptions {
        let s = &self.stepper;
        BridgeOptions {
            engine: self.engine_settings(),
            stepper: StepperSettings {
                pacer: PacerSettings {
                    tick_rate_hz: s.tick_rate_hz,
                    idle_after: Duration::from_millis(s.idle_after_ms),
                    idle_interval: Duration::from_millis(s.idle_interval_ms),
                },
                ..StepperSettings::default()
            },
            threaded: s.threaded,
            ready_timeout: Duration::from_millis(s.ready_timeout_ms),
        }
    }
}
