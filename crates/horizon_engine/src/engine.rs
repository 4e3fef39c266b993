//! # Physics Engine
//!
//! The state the stepper advances every tick.
//!
//! ```text
//! ControlInput ──► CameraOrbit ──► camera radius ──► time dilation ──► proper time
//!                                                                    
//! BlackHoleConfig ──► MetricCache ──► MetricQuantities ──► DiskProfile ──► DiskLut
//!                                                  │
//!                                                  └──► Ω(ISCO) ──► disk phase
//! ```
//!
//! The engine runs unchanged on the stepper thread and inside the bridge's
//! same-thread fallback.

use std::f64::consts::TAU;

use horizon_core::{CameraBlock, ControlInput, PhysicsBlock, RegionWriter};
use horizon_physics::{
    keplerian_angular_velocity, redshift, time_dilation, BlackHoleConfig, DiskProfile,
    MetricCache, MetricQuantities,
};

use crate::camera::{CameraOrbit, OrbitSettings};
use crate::error::{EngineError, EngineResult};
use crate::lut::DiskLut;

/// Largest step the integrator accepts, seconds.
pub const MAX_STEP_SECONDS: f64 = 0.033;

/// The published tick counter wraps here, the largest run of integers an
/// `f32` holds exactly. TELEMETRY `TICK_COUNT` carries the integer count.
pub const PUBLISHED_TICK_WRAP: u64 = 1 << 24;

/// Engine tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Upper bound on a single step, seconds.
    pub max_step_seconds: f64,
    /// Disk half-thickness ratio (clamped by the disk model).
    pub disk_thickness_ratio: f64,
    /// Disk temperature multiplier.
    pub temperature_multiplier: f64,
    /// Lensing strength forwarded to the renderer.
    pub lensing_strength: f64,
    /// Camera orbit tunables.
    pub orbit: OrbitSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_step_seconds: MAX_STEP_SECONDS,
            disk_thickness_ratio: horizon_physics::constants::DEFAULT_THICKNESS_RATIO,
            temperature_multiplier: 1.0,
            lensing_strength: 1.0,
            orbit: OrbitSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Rejects settings the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSettings`] naming the first bad field.
    pub fn validate(&self) -> EngineResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidSettings(format!("{name} must be positive, got {v}")))
            }
        };
        positive("max_step_seconds", self.max_step_seconds)?;
        positive("temperature_multiplier", self.temperature_multiplier)?;
        positive("orbit.damping", self.orbit.damping)?;
        positive("orbit.fov_y", self.orbit.fov_y)?;
        positive("orbit.initial_distance_rs", self.orbit.initial_distance_rs)?;
        if !(self.lensing_strength.is_finite() && self.lensing_strength >= 0.0) {
            return Err(EngineError::InvalidSettings(format!(
                "lensing_strength must be non-negative, got {}",
                self.lensing_strength
            )));
        }
        if !self.orbit.auto_rotate_speed.is_finite() {
            return Err(EngineError::InvalidSettings(
                "orbit.auto_rotate_speed must be finite".to_string(),
            ));
        }
        if !(self.orbit.near > 0.0 && self.orbit.far > self.orbit.near) {
            return Err(EngineError::InvalidSettings(format!(
                "clip planes must satisfy 0 < near < far, got {} / {}",
                self.orbit.near, self.orbit.far
            )));
        }
        Ok(())
    }
}

/// Clamps a frame interval to `[0, max]`; non-finite or negative becomes 0.
#[inline]
#[must_use]
pub fn clamp_step(dt: f64, max: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(max)
    } else {
        0.0
    }
}

/// Simulation state advanced by the stepper.
pub struct PhysicsEngine {
    config: BlackHoleConfig,
    config_generation: u32,
    settings: EngineSettings,
    cache: MetricCache,
    quantities: MetricQuantities,
    disk: DiskProfile,
    disk_angular_velocity: f64,
    orbit: CameraOrbit,
    lut: DiskLut,
    lut_dirty: bool,
    coordinate_time: f64,
    proper_time: f64,
    disk_phase: f64,
    last_step: f64,
    tick: u64,
    idle: bool,
}

impl PhysicsEngine {
    /// Builds the engine for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSettings`] when `settings` fail validation.
    pub fn new(config: BlackHoleConfig, settings: EngineSettings) -> EngineResult<Self> {
        settings.validate()?;
        let mut cache = MetricCache::new();
        let quantities = cache.get(&config);
        let disk = Self::disk_for(&config, &settings);
        let mut lut = DiskLut::new();
        lut.bake(&disk);

        Ok(Self {
            config,
            config_generation: 0,
            settings,
            cache,
            quantities,
            disk,
            disk_angular_velocity: keplerian_angular_velocity(
                disk.inner_edge,
                config.mass(),
                config.spin(),
            ),
            orbit: CameraOrbit::new(settings.orbit, &quantities),
            lut,
            lut_dirty: true,
            coordinate_time: 0.0,
            proper_time: 0.0,
            disk_phase: 0.0,
            last_step: 0.0,
            tick: 0,
            idle: false,
        })
    }

    fn disk_for(config: &BlackHoleConfig, settings: &EngineSettings) -> DiskProfile {
        DiskProfile::new(config)
            .with_thickness_ratio(settings.disk_thickness_ratio)
            .with_temperature_multiplier(settings.temperature_multiplier)
    }

    /// Applies a new mass / spin. Returns false when nothing changed.
    pub fn configure(&mut self, config: BlackHoleConfig) -> bool {
        if config == self.config {
            return false;
        }
        self.config = config;
        self.config_generation = self.config_generation.wrapping_add(1);
        self.quantities = self.cache.get(&config);
        self.disk = Self::disk_for(&config, &self.settings);
        self.disk_angular_velocity =
            keplerian_angular_velocity(self.disk.inner_edge, config.mass(), config.spin());
        self.orbit.set_limits(&self.quantities);
        self.lut.bake(&self.disk);
        self.lut_dirty = true;
        tracing::info!(
            mass = config.mass(),
            spin = config.spin(),
            generation = self.config_generation,
            "black hole configuration applied"
        );
        true
    }

    /// Advances the simulation. Returns the step actually taken, seconds.
    pub fn step(&mut self, dt_seconds: f64, input: &ControlInput) -> f64 {
        let dt = clamp_step(dt_seconds, self.settings.max_step_seconds);
        if input.has_motion() {
            self.orbit.apply_input(
                f64::from(input.dtheta),
                f64::from(input.dphi),
                f64::from(input.dzoom),
            );
        }
        self.orbit.advance(dt);

        self.coordinate_time += dt;
        self.proper_time += time_dilation(self.orbit.distance(), self.config.mass()) * dt;
        self.disk_phase = (self.disk_phase + self.disk_angular_velocity * dt).rem_euclid(TAU);
        self.last_step = dt;
        self.tick += 1;
        dt
    }

    /// Marks the engine idle-throttled (published in PHYSICS).
    pub fn set_idle(&mut self, idle: bool) {
        self.idle = idle;
    }

    /// The CAMERA segment.
    #[must_use]
    pub fn camera_block(&self) -> CameraBlock {
        self.orbit.block()
    }

    /// The PHYSICS segment.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn physics_block(&self) -> PhysicsBlock {
        let q = &self.quantities;
        let m = self.config.mass();
        let camera_radius = self.orbit.distance();
        let period = if self.disk_angular_velocity > 0.0 {
            TAU / self.disk_angular_velocity
        } else {
            0.0
        };

        PhysicsBlock {
            mass: m as f32,
            spin: self.config.spin() as f32,
            schwarzschild_radius: q.schwarzschild_radius as f32,
            event_horizon: q.event_horizon as f32,
            photon_sphere: q.photon_sphere as f32,
            isco_prograde: q.isco_prograde as f32,
            isco_retrograde: q.isco_retrograde as f32,
            disk_inner: self.disk.inner_edge as f32,
            disk_outer: self.disk.outer_edge as f32,
            disk_thickness_ratio: self.disk.thickness_ratio as f32,
            disk_inner_temperature: self.disk.temperature(self.disk.inner_edge) as f32,
            disk_outer_temperature: self.disk.temperature(self.disk.outer_edge) as f32,
            disk_angular_velocity: self.disk_angular_velocity as f32,
            disk_phase: self.disk_phase as f32,
            disk_orbital_period: period as f32,
            camera_radius: camera_radius as f32,
            camera_time_dilation: time_dilation(camera_radius, m) as f32,
            camera_redshift: redshift(camera_radius, m) as f32,
            isco_time_dilation: time_dilation(q.isco_prograde, m) as f32,
            isco_redshift: redshift(q.isco_prograde, m) as f32,
            horizon_margin: (camera_radius - q.event_horizon) as f32,
            lensing_strength: self.settings.lensing_strength as f32,
            coordinate_time: self.coordinate_time as f32,
            proper_time: self.proper_time as f32,
            step_dt: self.last_step as f32,
            tick: (self.tick % PUBLISHED_TICK_WRAP) as f32,
            prograde: if self.config.prograde() { 1.0 } else { 0.0 },
            config_generation: self.config_generation as f32,
            lut_generation: self.lut.generation() as f32,
            idle: if self.idle { 1.0 } else { 0.0 },
            temperature_multiplier: self.disk.temperature_multiplier as f32,
            auto_rotate_speed: self.settings.orbit.auto_rotate_speed as f32,
            reserved: [0.0; 32],
        }
    }

    /// Publishes CAMERA and PHYSICS (and the LUT after a rebake) in one
    /// sequence bracket.
    pub fn publish(&mut self, writer: &mut RegionWriter) {
        let camera = self.camera_block();
        let physics = self.physics_block();
        let guard = writer.begin();
        guard.write_camera(&camera);
        guard.write_physics(&physics);
        if self.lut_dirty {
            guard.write_lut(self.lut.temperatures(), self.lut.rgb(), self.lut.generation());
            self.lut_dirty = false;
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> BlackHoleConfig {
        self.config
    }

    /// Number of applied configuration changes.
    #[must_use]
    pub fn config_generation(&self) -> u32 {
        self.config_generation
    }

    /// Derived quantities for the current configuration.
    #[must_use]
    pub fn quantities(&self) -> &MetricQuantities {
        &self.quantities
    }

    /// Disk profile for the current configuration.
    #[must_use]
    pub fn disk(&self) -> &DiskProfile {
        &self.disk
    }

    /// Camera orbit.
    #[must_use]
    pub fn orbit(&self) -> &CameraOrbit {
        &self.orbit
    }

    /// Baked LUT.
    #[must_use]
    pub fn lut(&self) -> &DiskLut {
        &self.lut
    }

    /// Accumulated coordinate time, seconds.
    #[must_use]
    pub fn coordinate_time(&self) -> f64 {
        self.coordinate_time
    }

    /// Accumulated proper time of the camera, seconds.
    #[must_use]
    pub fn proper_time(&self) -> f64 {
        self.proper_time
    }

    /// Steps taken.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// True while the camera is still coasting from input.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.orbit.is_moving()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_core::{PhysicsBlock, ReadOutcome, SharedRegion};

    fn engine() -> PhysicsEngine {
        PhysicsEngine::new(BlackHoleConfig::schwarzschild(), EngineSettings::default())
            .expect("default settings are valid")
    }

    #[test]
    fn test_clamp_step() {
        assert_eq!(clamp_step(0.5, MAX_STEP_SECONDS), MAX_STEP_SECONDS);
        assert_eq!(clamp_step(0.01, MAX_STEP_SECONDS), 0.01);
        assert_eq!(clamp_step(-1.0, MAX_STEP_SECONDS), 0.0);
        assert_eq!(clamp_step(f64::NAN, MAX_STEP_SECONDS), 0.0);
        assert_eq!(clamp_step(f64::INFINITY, MAX_STEP_SECONDS), 0.0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let bad = EngineSettings {
            max_step_seconds: 0.0,
            ..EngineSettings::default()
        };
        assert!(matches!(
            PhysicsEngine::new(BlackHoleConfig::schwarzschild(), bad),
            Err(EngineError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_unit_mass_physics_block() {
        let block = engine().physics_block();
        assert_eq!(block.event_horizon, 2.0);
        assert_eq!(block.photon_sphere, 3.0);
        assert_eq!(block.isco_prograde, 6.0);
        assert_eq!(block.isco_retrograde, 6.0);
        assert_eq!(block.disk_outer, 200.0);
        assert!((block.isco_time_dilation - 0.816_496_6).abs() < 1e-6);
        assert!(block.is_finite());
    }

    #[test]
    fn test_published_tick_wraps_exactly() {
        let mut e = engine();
        e.tick = PUBLISHED_TICK_WRAP - 1;
        assert_eq!(e.physics_block().tick, 16_777_215.0);
        e.step(0.01, &ControlInput::default());
        assert_eq!(e.tick(), PUBLISHED_TICK_WRAP);
        assert_eq!(e.physics_block().tick, 0.0);
        e.tick = PUBLISHED_TICK_WRAP + 5;
        assert_eq!(e.physics_block().tick, 5.0);
    }

    #[test]
    fn test_step_is_clamped_and_accumulates_time() {
        let mut e = engine();
        let taken = e.step(1.0, &ControlInput::default());
        assert_eq!(taken, MAX_STEP_SECONDS);
        assert_eq!(e.tick(), 1);
        assert!((e.coordinate_time() - MAX_STEP_SECONDS).abs() < 1e-15);
        assert!(e.proper_time() < e.coordinate_time());
        assert!(e.proper_time() > 0.0);
    }

    #[test]
    fn test_input_moves_camera() {
        let mut e = engine();
        let input = ControlInput {
            dtheta: 0.3,
            ..ControlInput::default()
        };
        e.step(1.0 / 120.0, &input);
        assert!(e.is_moving());
        assert!(e.orbit().theta() > 0.0);
    }

    #[test]
    fn test_configure_rebakes_and_bumps_generation() {
        let mut e = engine();
        assert!(!e.configure(BlackHoleConfig::schwarzschild()));
        let spinning = BlackHoleConfig::new(1.0, 0.9).expect("valid");
        assert!(e.configure(spinning));
        assert_eq!(e.config_generation(), 1);
        assert_eq!(e.lut().generation(), 2);
        assert!(e.quantities().isco_prograde < 6.0);
        assert_eq!(e.physics_block().prograde, 1.0);
    }

    #[test]
    fn test_publish_writes_lut_once() {
        let region = SharedRegion::new();
        let mut writer = region.writer();
        let mut reader = region.reader();
        let mut e = engine();

        e.publish(&mut writer);
        assert_eq!(reader.telemetry().lut_generation, 1);

        let mut camera = CameraBlock::default();
        let mut physics = PhysicsBlock::default();
        assert_eq!(reader.read(&mut camera, &mut physics), ReadOutcome::Fresh(2));
        assert_eq!(physics.event_horizon, 2.0);
        assert_eq!(camera, e.camera_block());

        e.configure(BlackHoleConfig::new(2.0, 0.0).expect("valid"));
        e.publish(&mut writer);
        assert_eq!(reader.telemetry().lut_generation, 2);
    }

    #[test]
    fn test_disk_phase_wraps() {
        let mut e = engine();
        for _ in 0..10_000 {
            e.step(MAX_STEP_SECONDS, &ControlInput::default());
        }
        let phase = f64::from(e.physics_block().disk_phase);
        assert!((0.0..TAU).contains(&phase));
    }
}
