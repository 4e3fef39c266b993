//! # HORIZON Perf
//!
//! Keeps the renderer inside its frame budget.
//!
//! ```text
//! frame time ──► PerformanceMonitor ──► rolling FPS ──► AdaptiveResolution ──► scale
//!                        │
//!                        └──► BenchmarkController (explicit sessions only)
//!                                   │
//!                                   └──► BenchmarkReport { per-preset stats, recommendation }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod adaptive;
pub mod benchmark;
pub mod error;
pub mod monitor;
pub mod quality;

pub use adaptive::{AdaptiveResolution, AdaptiveSettings, DeviceClass, ResolutionState};
pub use benchmark::{
    recommend, BenchmarkController, BenchmarkPhase, BenchmarkReport, BenchmarkSettings,
    BenchmarkStep, PresetStats,
};
pub use error::{PerfError, PerfResult};
pub use monitor::{MonitorSettings, PerformanceMetrics, PerformanceMonitor, PerformanceWarning};
pub use quality::{QualityPreset, QualitySettings};
