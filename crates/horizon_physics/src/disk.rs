//! # Accretion Disk Profile
//!
//! Boundary conditions for the thin disk built on the metric kernel:
//!
//! ```text
//!  r_isco ────────────── disk ────────────── 100 r_s
//!  20 000 K                                    3 000 K
//!  (T ∝ r^-3/4, rescaled so both endpoints are exact)
//! ```

use crate::config::BlackHoleConfig;
use crate::constants::{
    DEFAULT_THICKNESS_RATIO, DISK_INNER_TEMPERATURE_K, DISK_OUTER_RADIUS_FACTOR,
    DISK_OUTER_TEMPERATURE_K, DISK_TEMPERATURE_EXPONENT, MAX_THICKNESS_RATIO,
    MIN_THICKNESS_RATIO,
};
use crate::metric::{isco, schwarzschild_radius};

/// Inner disk edge: the prograde ISCO.
#[inline]
#[must_use]
pub fn disk_inner_edge(mass: f64, spin: f64) -> f64 {
    isco(mass, spin, true)
}

/// Outer disk edge: `100 × 2m`.
#[inline]
#[must_use]
pub fn disk_outer_edge(mass: f64) -> f64 {
    DISK_OUTER_RADIUS_FACTOR * schwarzschild_radius(mass)
}

/// True when `isco <= r <= 100 × schwarzschild_radius`.
#[inline]
#[must_use]
pub fn within_disk_boundaries(radius: f64, isco: f64, schwarzschild_radius: f64) -> bool {
    radius >= isco && radius <= DISK_OUTER_RADIUS_FACTOR * schwarzschild_radius
}

/// Disk half-thickness at `radius`.
///
/// The ratio is clamped to `[0.01, 0.1]`; a non-finite ratio falls back to
/// the default of `0.05`.
#[inline]
#[must_use]
pub fn disk_thickness(radius: f64, ratio: f64) -> f64 {
    let ratio = if ratio.is_finite() {
        ratio.clamp(MIN_THICKNESS_RATIO, MAX_THICKNESS_RATIO)
    } else {
        DEFAULT_THICKNESS_RATIO
    };
    ratio * radius
}

/// Disk temperature at `radius`, Kelvin.
///
/// Follows the thin-disk `r^(-3/4)` law, rescaled so that `inner` maps to
/// exactly 20 000 K and `outer` to exactly 3 000 K before `multiplier` is
/// applied. Radii outside the disk are clamped to the nearest edge.
#[must_use]
pub fn disk_temperature(radius: f64, inner: f64, outer: f64, multiplier: f64) -> f64 {
    if outer <= inner || inner <= 0.0 {
        return DISK_INNER_TEMPERATURE_K * multiplier;
    }
    let r = radius.clamp(inner, outer);
    let profile = |x: f64| (inner / x).powf(DISK_TEMPERATURE_EXPONENT);
    let at_outer = profile(outer);
    let t = (profile(r) - at_outer) / (1.0 - at_outer);
    let base = DISK_OUTER_TEMPERATURE_K + (DISK_INNER_TEMPERATURE_K - DISK_OUTER_TEMPERATURE_K) * t;
    base * multiplier
}

/// Disk geometry and temperature profile for one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskProfile {
    /// Inner edge (prograde ISCO).
    pub inner_edge: f64,
    /// Outer edge (`100 r_s`).
    pub outer_edge: f64,
    /// Half-thickness to radius ratio (already clamped).
    pub thickness_ratio: f64,
    /// Temperature multiplier.
    pub temperature_multiplier: f64,
}

impl DiskProfile {
    /// Builds the default profile for a configuration.
    #[must_use]
    pub fn new(config: &BlackHoleConfig) -> Self {
        Self {
            inner_edge: disk_inner_edge(config.mass(), config.spin()),
            outer_edge: disk_outer_edge(config.mass()),
            thickness_ratio: DEFAULT_THICKNESS_RATIO,
            temperature_multiplier: 1.0,
        }
    }

    /// Sets the thickness ratio (clamped).
    #[must_use]
    pub fn with_thickness_ratio(mut self, ratio: f64) -> Self {
        self.thickness_ratio = disk_thickness(1.0, ratio);
        self
    }

    /// Sets the temperature multiplier.
    #[must_use]
    pub fn with_temperature_multiplier(mut self, multiplier: f64) -> Self {
        self.temperature_multiplier = multiplier;
        self
    }

    /// True when `radius` lies on the disk.
    #[must_use]
    pub fn contains(&self, radius: f64) -> bool {
        radius >= self.inner_edge && radius <= self.outer_edge
    }

    /// Half-thickness at `radius`.
    #[must_use]
    pub fn thickness(&self, radius: f64) -> f64 {
        disk_thickness(radius, self.thickness_ratio)
    }

    /// Temperature at `radius`.
    #[must_use]
    pub fn temperature(&self, radius: f64) -> f64 {
        disk_temperature(
            radius,
            self.inner_edge,
            self.outer_edge,
            self.temperature_multiplier,
        )
    }

    /// Radius at normalized position `t ∈ [0, 1]` across the disk.
    #[must_use]
    pub fn radius_at(&self, t: f64) -> f64 {
        self.inner_edge + (self.outer_edge - self.inner_edge) * t.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_for_unit_mass() {
        assert!((disk_inner_edge(1.0, 0.0) - 6.0).abs() < 1e-10);
        assert!((disk_outer_edge(1.0) - 200.0).abs() < 1e-10);
        assert_eq!(disk_inner_edge(2.0, 0.7), isco(2.0, 0.7, true));
    }

    #[test]
    fn test_boundaries_inclusive() {
        assert!(within_disk_boundaries(6.0, 6.0, 2.0));
        assert!(within_disk_boundaries(200.0, 6.0, 2.0));
        assert!(!within_disk_boundaries(5.99, 6.0, 2.0));
        assert!(!within_disk_boundaries(200.01, 6.0, 2.0));
    }

    #[test]
    fn test_thickness_clamps_ratio() {
        assert!((disk_thickness(10.0, 0.05) - 0.5).abs() < 1e-12);
        assert!((disk_thickness(10.0, 5.0) - 1.0).abs() < 1e-12);
        assert!((disk_thickness(10.0, -1.0) - 0.1).abs() < 1e-12);
        assert!((disk_thickness(10.0, f64::NAN) - 0.5).abs() < 1e-12);
        assert!((disk_thickness(20.0, 0.05) - 2.0 * disk_thickness(10.0, 0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_endpoints() {
        assert!((disk_temperature(6.0, 6.0, 200.0, 1.0) - 20_000.0).abs() < 1e-6);
        assert!((disk_temperature(200.0, 6.0, 200.0, 1.0) - 3_000.0).abs() < 1e-6);
        assert!((disk_temperature(6.0, 6.0, 200.0, 0.5) - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_temperature_monotonic() {
        let mut last = f64::INFINITY;
        let mut r = 6.0;
        while r <= 200.0 {
            let t = disk_temperature(r, 6.0, 200.0, 1.0);
            assert!(t <= last, "temperature rose at r={r}");
            assert!((3_000.0..=20_000.0).contains(&t));
            last = t;
            r += 0.5;
        }
    }

    #[test]
    fn test_temperature_outside_disk_clamps() {
        assert!((disk_temperature(1.0, 6.0, 200.0, 1.0) - 20_000.0).abs() < 1e-6);
        assert!((disk_temperature(1e6, 6.0, 200.0, 1.0) - 3_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_profile() {
        let config = BlackHoleConfig::new(1.0, 0.0).unwrap();
        let profile = DiskProfile::new(&config).with_thickness_ratio(0.5);
        assert!((profile.thickness_ratio - 0.1).abs() < 1e-12);
        assert!(profile.contains(50.0));
        assert!(!profile.contains(3.0));
        assert!((profile.radius_at(0.0) - profile.inner_edge).abs() < 1e-12);
        assert!((profile.radius_at(1.0) - profile.outer_edge).abs() < 1e-12);
        assert!(profile.inner_edge <= profile.outer_edge);
    }
}
