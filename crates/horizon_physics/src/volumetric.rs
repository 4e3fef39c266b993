//! # Volumetric Shading Math
//!
//! Scalar helpers the ray marcher evaluates per step while integrating
//! through the disk slab. Independent of the metric kernel.

use crate::constants::{
    DEFAULT_TERMINATION_THRESHOLD, FACE_ON_OPTICAL_DEPTH, MAX_PATH_LENGTH_FACTOR,
};

/// Vertical density falloff `exp(-k |y| / h)`.
///
/// `1.0` at the midplane, symmetric in `y`, within `[0, 1]`. A negative rate
/// is treated as zero; a non-positive scale height gives a razor-thin slab.
#[inline]
#[must_use]
pub fn density_falloff(y: f64, scale_height: f64, rate: f64) -> f64 {
    if scale_height <= 0.0 {
        return if y == 0.0 { 1.0 } else { 0.0 };
    }
    (-rate.max(0.0) * y.abs() / scale_height).exp().clamp(0.0, 1.0)
}

/// True once the accumulated density saturates the ray.
#[inline]
#[must_use]
pub fn should_terminate(accumulated_density: f64, threshold: f64) -> bool {
    accumulated_density >= threshold
}

#[inline]
fn smoothstep(x: f64) -> f64 {
    let t = x.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Smooth fade near a disk edge, in `[0, 1]`.
///
/// For an inner edge the fade grows as `radius` moves outward past the edge;
/// for an outer edge it drops as `radius` approaches the edge from inside.
/// Both ramps span `fade_width`. A non-positive width degenerates to a step.
#[must_use]
pub fn edge_fade(radius: f64, edge_radius: f64, fade_width: f64, is_inner_edge: bool) -> f64 {
    let distance = if is_inner_edge {
        radius - edge_radius
    } else {
        edge_radius - radius
    };
    if fade_width <= 0.0 {
        return if distance >= 0.0 { 1.0 } else { 0.0 };
    }
    smoothstep(distance / fade_width)
}

/// Relative optical path through the slab, in `[1, 3]`.
///
/// `angle` is `|cos|` between the view ray and the disk normal: `0` is
/// edge-on, `1` is face-on.
#[inline]
#[must_use]
pub fn path_length_factor(angle: f64) -> f64 {
    let cos = angle.abs().clamp(1.0 / MAX_PATH_LENGTH_FACTOR, 1.0);
    (1.0 / cos).clamp(1.0, MAX_PATH_LENGTH_FACTOR)
}

/// Slab opacity for a viewing angle (`0` edge-on, `1` face-on).
///
/// Beer–Lambert over [`path_length_factor`], so edge-on views are denser.
#[inline]
#[must_use]
pub fn view_angle_opacity(angle: f64) -> f64 {
    1.0 - (-FACE_ON_OPTICAL_DEPTH * path_length_factor(angle)).exp()
}

/// Componentwise `new * alpha + old * (1 - alpha)`, alpha clamped to `[0, 1]`.
#[inline]
#[must_use]
pub fn alpha_blend(new_color: [f64; 3], old_color: [f64; 3], alpha: f64) -> [f64; 3] {
    let alpha = alpha.clamp(0.0, 1.0);
    let keep = 1.0 - alpha;
    [
        new_color[0] * alpha + old_color[0] * keep,
        new_color[1] * alpha + old_color[1] * keep,
        new_color[2] * alpha + old_color[2] * keep,
    ]
}

/// Front-to-back accumulation along one ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeAccumulator {
    /// Accumulated color.
    pub color: [f64; 3],
    /// Accumulated density (opacity), `[0, 1]`.
    pub density: f64,
    /// Saturation threshold.
    pub threshold: f64,
}

impl VolumeAccumulator {
    /// Empty accumulator with the default 0.98 threshold.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            color: [0.0; 3],
            density: 0.0,
            threshold: DEFAULT_TERMINATION_THRESHOLD,
        }
    }

    /// Composites one sample behind what is already accumulated.
    ///
    /// Returns `true` when the ray should stop marching.
    pub fn absorb(&mut self, sample_color: [f64; 3], sample_alpha: f64) -> bool {
        if self.is_saturated() {
            return true;
        }
        let weight = (1.0 - self.density) * sample_alpha.clamp(0.0, 1.0);
        for (acc, s) in self.color.iter_mut().zip(sample_color) {
            *acc = (*acc + s * weight).clamp(0.0, 1.0);
        }
        self.density = (self.density + weight).clamp(0.0, 1.0);
        self.is_saturated()
    }

    /// True once density reached the threshold.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        should_terminate(self.density, self.threshold)
    }
}

impl Default for VolumeAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
