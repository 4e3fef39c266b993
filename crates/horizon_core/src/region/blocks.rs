//! Pod views of the published CAMERA and PHYSICS segments.

use bytemuck::{Pod, Zeroable};

use super::layout::{CAMERA_FLOATS, PHYSICS_FLOATS};

/// Camera state as published in the CAMERA segment (16 floats).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CameraBlock {
    /// Eye position.
    pub position: [f32; 3],
    /// Distance from the target.
    pub distance: f32,
    /// Look-at target (the hole).
    pub target: [f32; 3],
    /// Vertical field of view, radians.
    pub fov_y: f32,
    /// Up vector.
    pub up: [f32; 3],
    /// Azimuth, radians.
    pub theta: f32,
    /// Polar angle, radians.
    pub phi: f32,
    /// Near plane.
    pub near: f32,
    /// Far plane.
    pub far: f32,
    /// Magnitude of the current orbit angular velocity, rad/s.
    pub orbit_speed: f32,
}

/// Derived physics as published in the PHYSICS segment (64 floats).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PhysicsBlock {
    /// Mass, solar masses.
    pub mass: f32,
    /// Dimensionless spin.
    pub spin: f32,
    /// `2m`.
    pub schwarzschild_radius: f32,
    /// Kerr outer horizon.
    pub event_horizon: f32,
    /// Prograde photon orbit.
    pub photon_sphere: f32,
    /// Prograde ISCO.
    pub isco_prograde: f32,
    /// Retrograde ISCO.
    pub isco_retrograde: f32,
    /// Inner disk edge.
    pub disk_inner: f32,
    /// Outer disk edge.
    pub disk_outer: f32,
    /// Disk half-thickness ratio.
    pub disk_thickness_ratio: f32,
    /// Temperature at the inner edge, K.
    pub disk_inner_temperature: f32,
    /// Temperature at the outer edge, K.
    pub disk_outer_temperature: f32,
    /// Orbital angular velocity at the inner edge.
    pub disk_angular_velocity: f32,
    /// Disk rotation phase, radians in `[0, 2π)`.
    pub disk_phase: f32,
    /// Orbital period at the inner edge.
    pub disk_orbital_period: f32,
    /// Camera distance from the hole.
    pub camera_radius: f32,
    /// Time dilation at the camera.
    pub camera_time_dilation: f32,
    /// Redshift at the camera.
    pub camera_redshift: f32,
    /// Time dilation at the inner edge.
    pub isco_time_dilation: f32,
    /// Redshift at the inner edge.
    pub isco_redshift: f32,
    /// Camera radius minus horizon radius.
    pub horizon_margin: f32,
    /// `r_s / r_camera`, a cheap lensing strength cue.
    pub lensing_strength: f32,
    /// Simulated coordinate time, seconds.
    pub coordinate_time: f32,
    /// Camera proper time, seconds.
    pub proper_time: f32,
    /// Step applied on the last tick, seconds.
    pub step_dt: f32,
    /// Stepper tick number modulo 2^24 (exact in `f32`).
    pub tick: f32,
    /// 1.0 for a prograde disk.
    pub prograde: f32,
    /// Generation of the applied configuration.
    pub config_generation: f32,
    /// Generation of the LUT contents.
    pub lut_generation: f32,
    /// 1.0 while idle-throttled.
    pub idle: f32,
    /// Disk temperature multiplier.
    pub temperature_multiplier: f32,
    /// Idle auto-rotation speed, rad/s.
    pub auto_rotate_speed: f32,
    /// Reserved for future quantities.
    pub reserved: [f32; 32],
}

const _: () = assert!(std::mem::size_of::<CameraBlock>() == CAMERA_FLOATS * 4);
const _: () = assert!(std::mem::size_of::<PhysicsBlock>() == PHYSICS_FLOATS * 4);

impl CameraBlock {
    /// Float view.
    #[inline]
    #[must_use]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }

    /// Mutable float view.
    #[inline]
    pub fn as_floats_mut(&mut self) -> &mut [f32] {
        bytemuck::cast_slice_mut(std::slice::from_mut(self))
    }

    /// True when every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.as_floats().iter().all(|v| v.is_finite())
    }
}

impl PhysicsBlock {
    /// Float view.
    #[inline]
    #[must_use]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }

    /// Mutable float view.
    #[inline]
    pub fn as_floats_mut(&mut self) -> &mut [f32] {
        bytemuck::cast_slice_mut(std::slice::from_mut(self))
    }

    /// True when every quantity the renderer consumes is finite.
    ///
    /// Redshift fields may be `+∞`: that is their value when the point sits
    /// inside `2m`. NaN is never accepted.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.as_floats()
            .iter()
            .enumerate()
            .all(|(i, v)| v.is_finite() || (v.is_infinite() && v.is_sign_positive() && Self::may_be_infinite(i)))
    }

    fn may_be_infinite(index: usize) -> bool {
        const CAMERA_REDSHIFT: usize = 17;
        const ISCO_REDSHIFT: usize = 19;
        matches!(index, CAMERA_REDSHIFT | ISCO_REDSHIFT)
    }
}
