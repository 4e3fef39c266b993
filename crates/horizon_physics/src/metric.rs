//! # Metric Kernel
//!
//! Closed-form Kerr quantities in geometric units (`G = c = 1`).
//!
//! ```text
//!   r+ (horizon)  <  r_ph (photon orbit)  <  r_isco (prograde)  <=  r_isco (retrograde)
//!      m..2m            m..3m                    m..6m                 6m..9m
//! ```
//!
//! Spin is dimensionless and scaled by the mass internally (`a_geom = a * m`).
//! Horizon, photon orbit and ISCO depend only on `|a|`; the sign of the spin
//! only matters for the disk orbit direction.
//!
//! None of these functions validate their inputs. Callers must pass
//! `m > 0` and `a ∈ [-1, 1]` (see [`crate::BlackHoleConfig`]).

use crate::config::BlackHoleConfig;
use crate::constants::DISK_OUTER_RADIUS_FACTOR;

/// Schwarzschild radius `2m`.
#[inline]
#[must_use]
pub fn schwarzschild_radius(mass: f64) -> f64 {
    2.0 * mass
}

/// Outer (Kerr) event horizon `r+ = m + sqrt(m² - (a m)²)`.
///
/// Equals `2m` at zero spin and shrinks to `m` in the extremal limit.
#[inline]
#[must_use]
pub fn event_horizon(mass: f64, spin: f64) -> f64 {
    let a = spin * mass;
    mass + (mass * mass - a * a).max(0.0).sqrt()
}

/// Radius of the prograde circular photon orbit.
///
/// `r_ph = 2m (1 + cos(2/3 · acos(-|a|)))`, which is `3m` (1.5 × r_s) at zero
/// spin.
#[inline]
#[must_use]
pub fn photon_sphere(mass: f64, spin: f64) -> f64 {
    let a = spin.abs().min(1.0);
    2.0 * mass * (1.0 + ((2.0 / 3.0) * (-a).acos()).cos())
}

/// Innermost stable circular orbit (Bardeen–Press–Teukolsky).
///
/// Returns `6m` at zero spin in both directions. In the extremal limit the
/// prograde ISCO reaches `m` and the retrograde one `9m`.
#[must_use]
pub fn isco(mass: f64, spin: f64, prograde: bool) -> f64 {
    let a = spin.abs().min(1.0);
    let a2 = a * a;
    let z1 = 1.0 + (1.0 - a2).cbrt() * ((1.0 + a).cbrt() + (1.0 - a).cbrt());
    let z2 = (3.0 * a2 + z1 * z1).sqrt();
    let root = ((3.0 - z1) * (3.0 + z1 + 2.0 * z2)).max(0.0).sqrt();
    if prograde {
        mass * (3.0 + z2 - root)
    } else {
        mass * (3.0 + z2 + root)
    }
}

/// Gravitational time dilation factor `sqrt(1 - 2m/r)`.
///
/// Exactly `0.0` at and inside `r = 2m`: time is treated as frozen there.
#[inline]
#[must_use]
pub fn time_dilation(radius: f64, mass: f64) -> f64 {
    let rs = schwarzschild_radius(mass);
    if radius <= rs {
        0.0
    } else {
        (1.0 - rs / radius).sqrt()
    }
}

/// Gravitational redshift `z = 1 / time_dilation - 1`.
///
/// Infinite wherever the time dilation factor is zero.
#[inline]
#[must_use]
pub fn redshift(radius: f64, mass: f64) -> f64 {
    1.0 / time_dilation(radius, mass) - 1.0
}

/// Angular velocity of a circular equatorial orbit at `radius`.
///
/// `Ω = sqrt(m) / (r^(3/2) + a m^(3/2))`. Negative spin describes a
/// retrograde disk. Returns `0.0` where no circular orbit exists.
#[inline]
#[must_use]
pub fn keplerian_angular_velocity(radius: f64, mass: f64, spin: f64) -> f64 {
    let denom = radius.powf(1.5) + spin * mass.powf(1.5);
    if radius <= 0.0 || denom <= 0.0 {
        0.0
    } else {
        mass.sqrt() / denom
    }
}

/// Every derived quantity for one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricQuantities {
    /// Mass the quantities were computed for.
    pub mass: f64,
    /// Spin the quantities were computed for.
    pub spin: f64,
    /// Schwarzschild radius `2m`.
    pub schwarzschild_radius: f64,
    /// Kerr outer horizon.
    pub event_horizon: f64,
    /// Prograde photon orbit.
    pub photon_sphere: f64,
    /// Prograde ISCO.
    pub isco_prograde: f64,
    /// Retrograde ISCO.
    pub isco_retrograde: f64,
    /// Inner disk edge (prograde ISCO).
    pub disk_inner: f64,
    /// Outer disk edge (`100 r_s`).
    pub disk_outer: f64,
}

/// Time dilation and redshift at one radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialSample {
    /// Query radius.
    pub radius: f64,
    /// `sqrt(1 - 2m/r)`, zero inside `2m`.
    pub time_dilation: f64,
    /// `1/time_dilation - 1`.
    pub redshift: f64,
}

impl MetricQuantities {
    /// Computes all quantities for a validated configuration.
    #[must_use]
    pub fn compute(config: &BlackHoleConfig) -> Self {
        let (m, a) = (config.mass(), config.spin());
        let isco_prograde = isco(m, a, true);
        let rs = schwarzschild_radius(m);
        Self {
            mass: m,
            spin: a,
            schwarzschild_radius: rs,
            event_horizon: event_horizon(m, a),
            photon_sphere: photon_sphere(m, a),
            isco_prograde,
            isco_retrograde: isco(m, a, false),
            disk_inner: isco_prograde,
            disk_outer: DISK_OUTER_RADIUS_FACTOR * rs,
        }
    }

    /// Evaluates time dilation and redshift at `radius`.
    #[must_use]
    pub fn at_radius(&self, radius: f64) -> RadialSample {
        RadialSample {
            radius,
            time_dilation: time_dilation(radius, self.mass),
            redshift: redshift(radius, self.mass),
        }
    }
}

/// Single-entry memo of [`MetricQuantities`] keyed by the exact bits of
/// `(mass, spin)`.
#[derive(Debug, Default)]
pub struct MetricCache {
    entry: Option<((u64, u64), MetricQuantities)>,
    misses: u64,
}

impl MetricCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the quantities for `config`, recomputing only when the key
    /// changed.
    pub fn get(&mut self, config: &BlackHoleConfig) -> MetricQuantities {
        let key = (config.mass().to_bits(), config.spin().to_bits());
        match self.entry {
            Some((cached, quantities)) if cached == key => quantities,
            _ => {
                let quantities = MetricQuantities::compute(config);
                self.entry = Some((key, quantities));
                self.misses += 1;
                quantities
            }
        }
    }

    /// Number of recomputations performed.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}
