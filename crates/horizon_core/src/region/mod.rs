//! # Shared State Region
//!
//! ORDER: No locks. No torn frames. No compromises.
//!
//! ## The Problem
//!
//! ```text
//! Stepper (120 Hz):  WRITE camera + physics
//! Render  (vsync):   READ  camera + physics
//!
//! Without synchronization: half-written frame → camera jumps
//! With Mutex:              render stalls behind a physics tick
//! ```
//!
//! ## The Solution: Sequence Counter
//!
//! ```text
//! Writer:  seq += 1 (odd)  → copy segments → seq += 1 (even)
//! Reader:  s1 = seq → copy segments → s2 = seq
//!          s1 odd or s1 != s2  → discard, keep last-known-good
//! ```
//!
//! Every word is an `AtomicU32` holding `f32` bits, so the region is sound
//! without `unsafe` and the byte layout matches a float array view.

pub mod layout;
mod blocks;
mod shared;

pub use blocks::{CameraBlock, PhysicsBlock};
pub use shared::{
    ControlInput, PublishGuard, ReadOutcome, RegionReader, RegionWriter, SharedRegion,
    TelemetrySnapshot,
};
