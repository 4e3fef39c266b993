//! Quality presets and the settings each one applies.
//!
//! | Preset          | March steps | Disk samples | Scale | Bloom | Doppler | Stars |
//! |-----------------|-------------|--------------|-------|-------|---------|-------|
//! | Ultra           | 512         | 64           | 1.00  | yes   | yes     | yes   |
//! | High            | 256         | 32           | 1.00  | yes   | yes     | yes   |
//! | Balanced        | 128         | 16           | 0.85  | yes   | yes     | no    |
//! | MaxPerformance  | 64          | 8            | 0.60  | no    | no      | no    |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named quality level, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityPreset {
    /// Everything on, full resolution.
    Ultra,
    /// Full resolution, fewer steps.
    High,
    /// Reduced resolution.
    Balanced,
    /// Minimum cost.
    MaxPerformance,
}

impl QualityPreset {
    /// Every preset, highest quality first.
    pub const ALL: [Self; 4] = [Self::Ultra, Self::High, Self::Balanced, Self::MaxPerformance];

    /// Persisted name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ultra => "ultra",
            Self::High => "high",
            Self::Balanced => "balanced",
            Self::MaxPerformance => "max-performance",
        }
    }

    /// Settings this preset applies.
    #[must_use]
    pub const fn settings(self) -> QualitySettings {
        let (ray_march_steps, disk_samples, resolution_scale, rich) = match self {
            Self::Ultra => (512, 64, 1.0, true),
            Self::High => (256, 32, 1.0, true),
            Self::Balanced => (128, 16, 0.85, true),
            Self::MaxPerformance => (64, 8, 0.6, false),
        };
        QualitySettings {
            preset: self,
            ray_march_steps,
            disk_samples,
            resolution_scale,
            bloom: rich,
            gravitational_lensing: true,
            doppler_beaming: rich,
            star_field: matches!(self, Self::Ultra | Self::High),
            adaptive_resolution: true,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown quality preset `{s}`"))
    }
}

/// Renderer settings the perf layer controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualitySettings {
    /// Preset these settings started from.
    pub preset: QualityPreset,
    /// Ray-march steps per pixel.
    pub ray_march_steps: u32,
    /// Volumetric samples through the disk.
    pub disk_samples: u32,
    /// Render resolution scale.
    pub resolution_scale: f32,
    /// Bloom pass.
    pub bloom: bool,
    /// Gravitational lensing.
    pub gravitational_lensing: bool,
    /// Relativistic Doppler beaming.
    pub doppler_beaming: bool,
    /// Background star field.
    pub star_field: bool,
    /// Adaptive resolution controller enabled.
    pub adaptive_resolution: bool,
}

impl Default for QualitySettings {
    fn default() -> Self {
        QualityPreset::High.settings()
    }
}
