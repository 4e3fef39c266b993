//! # HORIZON Physics
//!
//! Closed-form relativistic quantities for a rotating (Kerr) black hole and
//! the accretion-disk / volumetric math the ray marcher consumes.
//!
//! ## Layout
//!
//! ```text
//! BlackHoleConfig (validated mass, spin)
//!        │
//!        ▼
//!   metric ──► event horizon, photon sphere, ISCO (pro/retro),
//!        │     time dilation, redshift, orbital angular velocity
//!        ▼
//!   disk ──► inner edge (= prograde ISCO), outer edge (= 100 r_s),
//!        │   thickness, temperature profile
//!        ▼
//!   spectrum ──► blackbody tint for the disk LUT
//!
//!   volumetric ──► density falloff, edge fade, view opacity, compositing
//! ```
//!
//! ## CRITICAL RULE
//!
//! The kernel performs no validation. Mass must be positive and spin must
//! lie in `[-1, 1]`; construct a [`BlackHoleConfig`] at the input boundary
//! and pass its fields in.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod constants;
pub mod disk;
pub mod error;
pub mod metric;
pub mod spectrum;
pub mod volumetric;

pub use config::BlackHoleConfig;
pub use error::{ConfigError, ConfigResult};
pub use metric::{
    event_horizon, isco, keplerian_angular_velocity, photon_sphere, redshift,
    schwarzschild_radius, time_dilation, MetricCache, MetricQuantities, RadialSample,
};
pub use disk::{
    disk_inner_edge, disk_outer_edge, disk_temperature, disk_thickness, within_disk_boundaries,
    DiskProfile,
};
pub use spectrum::blackbody_rgb;
pub use volumetric::{
    alpha_blend, density_falloff, edge_fade, path_length_factor, should_terminate,
    view_angle_opacity, VolumeAccumulator,
};
