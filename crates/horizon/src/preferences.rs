//! # Persisted Preferences
//!
//! A small key/value document the front end keeps between sessions:
//!
//! ```toml
//! preset = "balanced"
//! adaptive_resolution = true
//! bloom = true
//! gravitational_lensing = true
//! doppler_beaming = true
//! star_field = false
//! resolution_scale = 0.85
//! mass = 1.0
//! spin = 0.0
//! ```
//!
//! Loading is lenient: a key with the wrong type or an out-of-range value
//! is dropped with a warning and its default kept. The rest of the
//! document still applies.

use serde::Serialize;
use toml::{Table, Value};
use tracing::warn;

use horizon_perf::{QualityPreset, QualitySettings};
use horizon_physics::BlackHoleConfig;

use crate::error::HorizonResult;

/// Smallest stored render scale.
pub const MIN_RESOLUTION_SCALE: f32 = 0.25;
/// Largest stored render scale.
pub const MAX_RESOLUTION_SCALE: f32 = 1.0;

/// User choices restored at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preferences {
    /// Quality preset.
    pub preset: QualityPreset,
    /// Adaptive resolution toggle.
    pub adaptive_resolution: bool,
    /// Bloom pass.
    pub bloom: bool,
    /// Gravitational lensing.
    pub gravitational_lensing: bool,
    /// Doppler beaming.
    pub doppler_beaming: bool,
    /// Star field.
    pub star_field: bool,
    /// Render scale in `[0.25, 1.0]`.
    pub resolution_scale: f32,
    /// Solar masses, `> 0`.
    pub mass: f64,
    /// Spin in `[-1, 1]`.
    pub spin: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::from_settings(&QualitySettings::default(), &BlackHoleConfig::default())
    }
}

impl Preferences {
    /// Captures the current session state.
    #[must_use]
    pub fn from_settings(settings: &QualitySettings, config: &BlackHoleConfig) -> Self {
        Self {
            preset: settings.preset,
            adaptive_resolution: settings.adaptive_resolution,
            bloom: settings.bloom,
            gravitational_lensing: settings.gravitational_lensing,
            doppler_beaming: settings.doppler_beaming,
            star_field: settings.star_field,
            resolution_scale: settings.resolution_scale.clamp(MIN_RESOLUTION_SCALE, MAX_RESOLUTION_SCALE),
            mass: config.mass(),
            spin: config.spin(),
        }
    }

    /// Loads a preferences document, keeping defaults for rejected keys.
    ///
    /// Returns the preferences and the names of the keys that were
    /// rejected. A document that is not TOML at all is reported as the
    /// single entry `"<document>"`.
    #[must_use]
    pub fn load_lenient(text: &str) -> (Self, Vec<String>) {
        let mut prefs = Self::default();
        let mut rejected = Vec::new();

        let table = match text.parse::<Table>() {
            Ok(table) => table,
            Err(e) => {
                warn!("Preferences unreadable, using defaults: {}", e);
                rejected.push("<document>".to_string());
                return (prefs, rejected);
            }
        };

        // Preset first so the per-feature keys override its toggles.
        if let Some(value) = table.get("preset") {
            match value.as_str().and_then(|s| s.parse::<QualityPreset>().ok()) {
                Some(preset) => prefs.apply_preset(preset),
                None => reject(&mut rejected, "preset", value),
            }
        }

        for (key, value) in &table {
            let accepted = match key.as_str() {
                "preset" => continue,
                "adaptive_resolution" => set_bool(value, &mut prefs.adaptive_resolution),
                "bloom" => set_bool(value, &mut prefs.bloom),
                "gravitational_lensing" => set_bool(value, &mut prefs.gravitational_lensing),
                "doppler_beaming" => set_bool(value, &mut prefs.doppler_beaming),
                "star_field" => set_bool(value, &mut prefs.star_field),
                "resolution_scale" => match number(value) {
                    Some(v) if (f64::from(MIN_RESOLUTION_SCALE)..=f64::from(MAX_RESOLUTION_SCALE)).contains(&v) => {
                        prefs.resolution_scale = v as f32;
                        true
                    }
                    _ => false,
                },
                "mass" => match number(value) {
                    Some(v) if v.is_finite() && v > 0.0 => {
                        prefs.mass = v;
                        true
                    }
                    _ => false,
                },
                "spin" => match number(value) {
                    Some(v) if (-1.0..=1.0).contains(&v) => {
                        prefs.spin = v;
                        true
                    }
                    _ => false,
                },
                _ => false,
            };
            if !accepted {
                reject(&mut rejected, key, value);
            }
        }

        (prefs, rejected)
    }

    /// Serializes to the document format `load_lenient` reads.
    ///
    /// # Errors
    ///
    /// [`crate::HorizonError::Serialize`] if a value cannot be represented.
    pub fn to_toml_string(&self) -> HorizonResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Renderer settings: the preset's values with the stored toggles.
    #[must_use]
    pub fn quality_settings(&self) -> QualitySettings {
        QualitySettings {
            adaptive_resolution: self.adaptive_resolution,
            bloom: self.bloom,
            gravitational_lensing: self.gravitational_lensing,
            doppler_beaming: self.doppler_beaming,
            star_field: self.star_field,
            resolution_scale: self.resolution_scale,
            ..self.preset.settings()
        }
    }

    /// Stored black hole configuration.
    #[must_use]
    pub fn black_hole(&self) -> BlackHoleConfig {
        BlackHoleConfig::new(self.mass, self.spin).unwrap_or_default()
    }

    fn apply_preset(&mut self, preset: QualityPreset) {
        let settings = preset.settings();
        self.preset = preset;
        self.bloom = settings.bloom;
        self.gravitational_lensing = settings.gravitational_lensing;
        self.doppler_beaming = settings.doppler_beaming;
        self.star_field = settings.star_field;
        self.resolution_scale = settings.resolution_scale;
    }
}

fn set_bool(value: &Value, slot: &mut bool) -> bool {
    match value.as_bool() {
        Some(b) => {
            *slot = b;
            true
        }
        None => false,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

fn reject(rejected: &mut Vec<String>, key: &str, value: &Value) {
    warn!("Ignoring preference `{}` = {}", key, value);
    rejected.push(key.to_string());
}
