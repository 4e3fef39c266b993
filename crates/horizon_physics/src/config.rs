//! Validated black hole parameters.
//!
//! This is the input boundary: user-facing code builds a `BlackHoleConfig`
//! and only validated values ever reach the metric kernel.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::metric;

/// Mass and dimensionless spin of the black hole.
///
/// The sign of `spin` selects the disk orbit direction relative to the hole's
/// rotation: non-negative spin means a prograde disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig", into = "RawConfig")]
pub struct BlackHoleConfig {
    mass: f64,
    spin: f64,
}

#[derive(Serialize, Deserialize)]
struct RawConfig {
    mass: f64,
    spin: f64,
}

impl BlackHoleConfig {
    /// Validates and creates a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when either value is non-finite, the mass is
    /// not positive, or `|spin| > 1`.
    pub fn new(mass: f64, spin: f64) -> ConfigResult<Self> {
        if !mass.is_finite() {
            return Err(ConfigError::NonFinite("mass"));
        }
        if !spin.is_finite() {
            return Err(ConfigError::NonFinite("spin"));
        }
        if mass <= 0.0 {
            return Err(ConfigError::NonPositiveMass(mass));
        }
        if spin.abs() > 1.0 {
            return Err(ConfigError::SpinOutOfRange(spin));
        }
        Ok(Self { mass, spin })
    }

    /// A one-solar-mass, non-rotating hole.
    #[must_use]
    pub const fn schwarzschild() -> Self {
        Self { mass: 1.0, spin: 0.0 }
    }

    /// Mass in solar masses.
    #[inline]
    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    /// Dimensionless spin in `[-1, 1]`.
    #[inline]
    #[must_use]
    pub const fn spin(&self) -> f64 {
        self.spin
    }

    /// True when the disk co-rotates with the hole.
    #[inline]
    #[must_use]
    pub fn prograde(&self) -> bool {
        self.spin >= 0.0
    }

    /// Schwarzschild radius `2m`.
    #[inline]
    #[must_use]
    pub fn schwarzschild_radius(&self) -> f64 {
        metric::schwarzschild_radius(self.mass)
    }

    /// Returns a copy with a new mass, validated.
    ///
    /// # Errors
    ///
    /// See [`BlackHoleConfig::new`].
    pub fn with_mass(self, mass: f64) -> ConfigResult<Self> {
        Self::new(mass, self.spin)
    }

    /// Returns a copy with a new spin, validated.
    ///
    /// # Errors
    ///
    /// See [`BlackHoleConfig::new`].
    pub fn with_spin(self, spin: f64) -> ConfigResult<Self> {
        Self::new(self.mass, spin)
    }
}

impl Default for BlackHoleConfig {
    fn default() -> Self {
        Self::schwarzschild()
    }
}

impl TryFrom<RawConfig> for BlackHoleConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> ConfigResult<Self> {
        Self::new(raw.mass, raw.spin)
    }
}

impl From<BlackHoleConfig> for RawConfig {
    fn from(config: BlackHoleConfig) -> Self {
        Self {
            mass: config.mass,
            spin: config.spin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = BlackHoleConfig::new(4.0, -0.5).unwrap();
        assert_eq!(config.mass(), 4.0);
        assert_eq!(config.spin(), -0.5);
        assert!(!config.prograde());
        assert_eq!(config.schwarzschild_radius(), 8.0);
    }

    #[test]
    fn test_rejects_bad_mass() {
        assert_eq!(
            BlackHoleConfig::new(0.0, 0.0),
            Err(ConfigError::NonPositiveMass(0.0))
        );
        assert_eq!(
            BlackHoleConfig::new(-2.0, 0.0),
            Err(ConfigError::NonPositiveMass(-2.0))
        );
        assert_eq!(
            BlackHoleConfig::new(f64::NAN, 0.0),
            Err(ConfigError::NonFinite("mass"))
        );
    }

    #[test]
    fn test_rejects_bad_spin() {
        assert_eq!(
            BlackHoleConfig::new(1.0, 1.01),
            Err(ConfigError::SpinOutOfRange(1.01))
        );
        assert_eq!(
            BlackHoleConfig::new(1.0, f64::INFINITY),
            Err(ConfigError::NonFinite("spin"))
        );
        assert!(BlackHoleConfig::new(1.0, -1.0).is_ok());
        assert!(BlackHoleConfig::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_with_helpers_revalidate() {
        let config = BlackHoleConfig::default();
        assert!(config.with_spin(2.0).is_err());
        assert_eq!(config.with_mass(3.0).unwrap().mass(), 3.0);
    }
}
