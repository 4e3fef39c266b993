//! # Physical and Rendering Constants
//!
//! All distances are in geometric units where `G = c = 1` and the mass is
//! expressed in solar masses, so the Schwarzschild radius of a unit-mass
//! hole is `2.0`.

// =============================================================================
// DISK PROFILE
// =============================================================================

/// Outer disk edge in multiples of the Schwarzschild radius.
pub const DISK_OUTER_RADIUS_FACTOR: f64 = 100.0;

/// Default half-thickness to radius ratio.
pub const DEFAULT_THICKNESS_RATIO: f64 = 0.05;

/// Thinnest allowed disk ratio.
pub const MIN_THICKNESS_RATIO: f64 = 0.01;

/// Thickest allowed disk ratio.
pub const MAX_THICKNESS_RATIO: f64 = 0.1;

/// Temperature at the inner edge (ISCO), Kelvin.
pub const DISK_INNER_TEMPERATURE_K: f64 = 20_000.0;

/// Temperature at the outer edge, Kelvin.
pub const DISK_OUTER_TEMPERATURE_K: f64 = 3_000.0;

/// Exponent of the thin-disk radial temperature law `T ∝ r^(-3/4)`.
pub const DISK_TEMPERATURE_EXPONENT: f64 = 0.75;

// =============================================================================
// VOLUMETRIC MARCHING
// =============================================================================

/// Default vertical density falloff rate.
pub const DEFAULT_FALLOFF_RATE: f64 = 3.0;

/// Accumulated density at which a ray stops marching.
pub const DEFAULT_TERMINATION_THRESHOLD: f64 = 0.98;

/// Longest optical path through the disk relative to face-on viewing.
pub const MAX_PATH_LENGTH_FACTOR: f64 = 3.0;

/// Optical depth of the disk slab at face-on incidence.
pub const FACE_ON_OPTICAL_DEPTH: f64 = 0.8;

// =============================================================================
// SPECTRUM
// =============================================================================

/// Coolest temperature the blackbody approximation covers, Kelvin.
pub const BLACKBODY_MIN_K: f64 = 1_000.0;

/// Hottest temperature the blackbody approximation covers, Kelvin.
pub const BLACKBODY_MAX_K: f64 = 40_000.0;
