//! # HORIZON Core
//!
//! The shared state region that connects the fixed-rate physics stepper to
//! the display-rate render loop.
//!
//! ## Architecture Rules
//!
//! 1. **Single writer** - only the stepper publishes CAMERA / PHYSICS / TELEMETRY
//! 2. **No locks** - readers detect torn copies through the sequence counter
//! 3. **Fixed layout** - float offsets are a wire contract (see [`layout`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use horizon_core::{SharedRegion, CameraBlock, PhysicsBlock, ReadOutcome};
//!
//! let region = SharedRegion::new();
//! let mut writer = region.writer();
//! let mut reader = region.reader();
//!
//! writer.publish(&CameraBlock::default(), &PhysicsBlock::default());
//!
//! let (mut camera, mut physics) = (CameraBlock::default(), PhysicsBlock::default());
//! assert!(matches!(reader.read(&mut camera, &mut physics), ReadOutcome::Fresh(_)));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod region;

pub use region::{
    layout, CameraBlock, ControlInput, PhysicsBlock, PublishGuard, ReadOutcome, RegionReader,
    RegionWriter, SharedRegion, TelemetrySnapshot,
};
