//! Disk temperature / tint lookup table published into LUT storage.
//!
//! ```text
//! LUT_OFFSET
//! ├── [0, 256)     temperature (K) at t = i / 255 across the disk
//! └── [256, 1024)  blackbody RGB, three floats per sample
//! ```

use horizon_core::layout::LUT_SAMPLES;
use horizon_physics::{blackbody_rgb, DiskProfile};

/// Baked disk LUT. Buffers are allocated once.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskLut {
    temperatures: Vec<f32>,
    rgb: Vec<f32>,
    generation: u32,
}

impl DiskLut {
    /// Zeroed table at generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            temperatures: vec![0.0; LUT_SAMPLES],
            rgb: vec![0.0; LUT_SAMPLES * 3],
            generation: 0,
        }
    }

    /// Resamples `disk` and bumps the generation.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn bake(&mut self, disk: &DiskProfile) {
        let last = (LUT_SAMPLES - 1) as f64;
        for (i, (temperature, rgb)) in self
            .temperatures
            .iter_mut()
            .zip(self.rgb.chunks_exact_mut(3))
            .enumerate()
        {
            let kelvin = disk.temperature(disk.radius_at(i as f64 / last));
            *temperature = kelvin as f32;
            let [r, g, b] = blackbody_rgb(kelvin);
            rgb.copy_from_slice(&[r as f32, g as f32, b as f32]);
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Temperatures, inner edge first.
    #[must_use]
    pub fn temperatures(&self) -> &[f32] {
        &self.temperatures
    }

    /// RGB triples, inner edge first.
    #[must_use]
    pub fn rgb(&self) -> &[f32] {
        &self.rgb
    }

    /// Bake counter.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl Default for DiskLut {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_physics::BlackHoleConfig;

    #[test]
    fn test_bake_spans_temperature_range() {
        let mut lut = DiskLut::new();
        lut.bake(&DiskProfile::new(&BlackHoleConfig::schwarzschild()));
        assert_eq!(lut.generation(), 1);

        let t = lut.temperatures();
        assert!((t[0] - 20_000.0).abs() < 1.0);
        assert!((t[LUT_SAMPLES - 1] - 3_000.0).abs() < 1.0);
        assert!(t.windows(2).all(|w| w[1] <= w[0]));
        assert!(lut.rgb().iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_inner_edge_is_bluer_than_outer() {
        let mut lut = DiskLut::new();
        lut.bake(&DiskProfile::new(&BlackHoleConfig::schwarzschild()));
        let rgb = lut.rgb();
        let inner_blue = rgb[2];
        let outer_blue = rgb[(LUT_SAMPLES - 1) * 3 + 2];
        assert!(inner_blue >= outer_blue);
    }
}
