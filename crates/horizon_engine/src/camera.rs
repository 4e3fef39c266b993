//! # Camera Orbit
//!
//! Spherical orbit around the hole with damped input.
//!
//! ```text
//!            y (up)
//!            │   φ = polar angle from +y
//!            │  ╱
//!            │ ╱  camera
//!            │╱
//!   ─────────●──────── x      θ = azimuth in the xz-plane
//!           ╱ hole
//!          z
//! ```
//!
//! Input deltas become angular rates that decay exponentially. The decay
//! is integrated exactly, so a delta of `d` radians moves the camera by
//! `d` radians in total no matter how the ticks are sliced.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use horizon_core::CameraBlock;
use horizon_physics::MetricQuantities;

/// Distance from the poles the polar angle may approach.
pub const POLAR_EPSILON: f64 = 0.01;

/// Minimum camera distance as a multiple of the event horizon.
pub const MIN_DISTANCE_HORIZON_FACTOR: f64 = 1.5;

/// Maximum camera distance as a multiple of the mass.
pub const MAX_DISTANCE_MASS_FACTOR: f64 = 500.0;

/// Rates below this snap to zero.
const REST_RATE: f64 = 1e-9;

/// Tunables for [`CameraOrbit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSettings {
    /// Exponential decay rate of orbit velocity, 1/s.
    pub damping: f64,
    /// Vertical field of view, radians.
    pub fov_y: f64,
    /// Near plane.
    pub near: f64,
    /// Far plane.
    pub far: f64,
    /// Constant azimuthal drift, rad/s.
    pub auto_rotate_speed: f64,
    /// Starting distance as a multiple of the Schwarzschild radius.
    pub initial_distance_rs: f64,
    /// Starting polar angle, radians.
    pub initial_phi: f64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            damping: 6.0,
            fov_y: 60_f64.to_radians(),
            near: 0.1,
            far: 10_000.0,
            auto_rotate_speed: 0.0,
            initial_distance_rs: 15.0,
            initial_phi: FRAC_PI_2 - 0.15,
        }
    }
}

/// Damped spherical camera orbit.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraOrbit {
    settings: OrbitSettings,
    theta: f64,
    phi: f64,
    distance: f64,
    theta_rate: f64,
    phi_rate: f64,
    zoom_rate: f64,
    min_distance: f64,
    max_distance: f64,
}

impl CameraOrbit {
    /// Places the camera for the given hole.
    #[must_use]
    pub fn new(settings: OrbitSettings, quantities: &MetricQuantities) -> Self {
        let mut orbit = Self {
            settings,
            theta: 0.0,
            phi: settings.initial_phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON),
            distance: settings.initial_distance_rs * quantities.schwarzschild_radius,
            theta_rate: 0.0,
            phi_rate: 0.0,
            zoom_rate: 0.0,
            min_distance: 0.0,
            max_distance: f64::MAX,
        };
        orbit.set_limits(quantities);
        orbit
    }

    /// Recomputes the distance limits after mass or spin changed.
    pub fn set_limits(&mut self, quantities: &MetricQuantities) {
        self.min_distance = quantities.event_horizon * MIN_DISTANCE_HORIZON_FACTOR;
        self.max_distance = quantities.mass * MAX_DISTANCE_MASS_FACTOR;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Adds input deltas. Positive `dzoom` moves the camera outward;
    /// it is a change in log-distance.
    pub fn apply_input(&mut self, dtheta: f64, dphi: f64, dzoom: f64) {
        let k = self.settings.damping;
        if dtheta.is_finite() {
            self.theta_rate += dtheta * k;
        }
        if dphi.is_finite() {
            self.phi_rate += dphi * k;
        }
        if dzoom.is_finite() {
            self.zoom_rate += dzoom * k;
        }
    }

    /// Advances the orbit by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let k = self.settings.damping;
        let decay = (-k * dt).exp();
        let travel = if k > 0.0 { (1.0 - decay) / k } else { dt };

        self.theta = (self.theta + self.theta_rate * travel + self.settings.auto_rotate_speed * dt)
            .rem_euclid(TAU);

        let phi = self.phi + self.phi_rate * travel;
        self.phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        if (self.phi - phi).abs() > 0.0 {
            self.phi_rate = 0.0;
        }

        let distance = self.distance * (self.zoom_rate * travel).exp();
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        if (self.distance - distance).abs() > 0.0 {
            self.zoom_rate = 0.0;
        }

        self.theta_rate = settle(self.theta_rate * decay);
        self.phi_rate = settle(self.phi_rate * decay);
        self.zoom_rate = settle(self.zoom_rate * decay);
    }

    /// True while any input-driven motion remains.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.theta_rate != 0.0 || self.phi_rate != 0.0 || self.zoom_rate != 0.0
    }

    /// Azimuth, radians in `[0, 2π)`.
    #[inline]
    #[must_use]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Polar angle, radians in `[ε, π − ε]`.
    #[inline]
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Distance from the hole.
    #[inline]
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Allowed distance range.
    #[must_use]
    pub fn distance_limits(&self) -> (f64, f64) {
        (self.min_distance, self.max_distance)
    }

    /// Magnitude of the current angular velocity, rad/s.
    #[must_use]
    pub fn angular_speed(&self) -> f64 {
        let azimuthal = (self.theta_rate + self.settings.auto_rotate_speed) * self.phi.sin();
        azimuthal.hypot(self.phi_rate)
    }

    /// Eye position (y-up, hole at the origin).
    #[must_use]
    pub fn position(&self) -> [f64; 3] {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        [
            self.distance * sin_phi * cos_theta,
            self.distance * cos_phi,
            self.distance * sin_phi * sin_theta,
        ]
    }

    /// The CAMERA segment for the current state.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn block(&self) -> CameraBlock {
        let [x, y, z] = self.position();
        CameraBlock {
            position: [x as f32, y as f32, z as f32],
            distance: self.distance as f32,
            target: [0.0; 3],
            fov_y: self.settings.fov_y as f32,
            up: [0.0, 1.0, 0.0],
            theta: self.theta as f32,
            phi: self.phi as f32,
            near: self.settings.near as f32,
            far: self.settings.far as f32,
            orbit_speed: self.angular_speed() as f32,
        }
    }
}

#[inline]
fn settle(rate: f64) -> f64 {
    if rate.abs() < REST_RATE {
        0.0
    } else {
        rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_physics::BlackHoleConfig;

    fn orbit() -> CameraOrbit {
        let q = MetricQuantities::compute(&BlackHoleConfig::schwarzschild());
        CameraOrbit::new(OrbitSettings::default(), &q)
    }

    fn run(orbit: &mut CameraOrbit, seconds: f64, dt: f64) {
        let mut t = 0.0;
        while t < seconds {
            orbit.advance(dt);
            t += dt;
        }
    }

    #[test]
    fn test_initial_placement() {
        let o = orbit();
        assert!((o.distance() - 30.0).abs() < 1e-12);
        assert_eq!(o.distance_limits(), (3.0, 500.0));
        assert!(!o.is_moving());
    }

    #[test]
    fn test_delta_total_is_independent_of_tick_size() {
        let mut coarse = orbit();
        let mut fine = orbit();
        coarse.apply_input(0.5, 0.0, 0.0);
        fine.apply_input(0.5, 0.0, 0.0);
        run(&mut coarse, 10.0, 1.0 / 30.0);
        run(&mut fine, 10.0, 1.0 / 240.0);
        assert!((coarse.theta() - 0.5).abs() < 1e-6);
        assert!((fine.theta() - 0.5).abs() < 1e-6);
        assert!(!coarse.is_moving());
    }

    #[test]
    fn test_polar_clamp() {
        let mut o = orbit();
        o.apply_input(0.0, -10.0, 0.0);
        run(&mut o, 5.0, 1.0 / 120.0);
        assert!((o.phi() - POLAR_EPSILON).abs() < 1e-12);
        o.apply_input(0.0, 20.0, 0.0);
        run(&mut o, 5.0, 1.0 / 120.0);
        assert!((o.phi() - (PI - POLAR_EPSILON)).abs() < 1e-12);
    }

    #[test]
    fn test_distance_clamp() {
        let mut o = orbit();
        o.apply_input(0.0, 0.0, -50.0);
        run(&mut o, 5.0, 1.0 / 120.0);
        assert!((o.distance() - 3.0).abs() < 1e-12);
        o.apply_input(0.0, 0.0, 50.0);
        run(&mut o, 5.0, 1.0 / 120.0);
        assert!((o.distance() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_limits_follow_configuration() {
        let mut o = orbit();
        let heavy = MetricQuantities::compute(&BlackHoleConfig::new(0.05, 0.0).unwrap_or_default());
        o.set_limits(&heavy);
        assert!((o.distance() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_position_matches_spherical_coordinates() {
        let o = orbit();
        let [x, y, z] = o.position();
        assert!(((x * x + y * y + z * z).sqrt() - o.distance()).abs() < 1e-9);
        assert!(y > 0.0);
        let block = o.block();
        assert_eq!(block.up, [0.0, 1.0, 0.0]);
        assert!(block.is_finite());
    }

    #[test]
    fn test_non_finite_input_ignored() {
        let mut o = orbit();
        o.apply_input(f64::NAN, f64::INFINITY, 0.0);
        assert!(!o.is_moving());
    }

    #[test]
    fn test_auto_rotate_drifts() {
        let q = MetricQuantities::compute(&BlackHoleConfig::schwarzschild());
        let settings = OrbitSettings {
            auto_rotate_speed: 0.1,
            ..OrbitSettings::default()
        };
        let mut o = CameraOrbit::new(settings, &q);
        o.advance(1.0);
        assert!((o.theta() - 0.1).abs() < 1e-12);
        assert!(o.angular_speed() > 0.0);
    }
}
