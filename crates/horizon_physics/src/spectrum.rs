//! Blackbody tint approximation used to bake the disk color LUT.

use crate::constants::{BLACKBODY_MAX_K, BLACKBODY_MIN_K};

/// Normalized RGB tint of a blackbody at `temperature_k`.
///
/// Piecewise fit valid over 1 000–40 000 K; inputs outside that range are
/// clamped. Every channel is in `[0, 1]`.
#[must_use]
pub fn blackbody_rgb(temperature_k: f64) -> [f64; 3] {
    let t = temperature_k.clamp(BLACKBODY_MIN_K, BLACKBODY_MAX_K) / 100.0;

    let red = if t <= 66.0 {
        1.0
    } else {
        1.292_936_186 * (t - 60.0).powf(-0.133_204_759_2)
    };

    let green = if t <= 66.0 {
        0.390_081_578_8 * t.ln() - 0.631_841_443_8
    } else {
        1.129_890_861 * (t - 60.0).powf(-0.075_514_849_2)
    };

    let blue = if t >= 66.0 {
        1.0
    } else if t <= 19.0 {
        0.0
    } else {
        0.543_206_789_1 * (t - 10.0).ln() - 1.196_254_089
    };

    [
        red.clamp(0.0, 1.0),
        green.clamp(0.0, 1.0),
        blue.clamp(0.0, 1.0),
    ]
}
