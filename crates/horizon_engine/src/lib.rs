//! # HORIZON Engine
//!
//! Advances the simulation and hands consistent snapshots to the renderer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │  Stepper thread (120 Hz) │        │  Render side (vsync)     │
//! │                          │        │                          │
//! │  drain CONTROL           │        │  PhysicsBridge::tick(dt) │
//! │  PhysicsEngine::step     │──────► │  seq check + cache       │
//! │  publish CAMERA/PHYSICS  │ region │  push_orbit / configure  │
//! └──────────────────────────┘        └──────────────────────────┘
//!              ▲                                   │
//!              └──── StepperCommand (crossbeam) ───┘
//! ```
//!
//! When threads are unavailable the bridge owns the engine and steps it
//! synchronously against a private region ([`BridgeState::Degraded`]).

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bridge;
pub mod camera;
pub mod engine;
pub mod error;
pub mod lut;
pub mod stepper;
pub mod tick;

pub use bridge::{BridgeOptions, BridgeState, BridgeStats, Capabilities, FrameSnapshot, PhysicsBridge};
pub use camera::{CameraOrbit, OrbitSettings};
pub use engine::{clamp_step, EngineSettings, PhysicsEngine};
pub use error::{EngineError, EngineResult};
pub use lut::DiskLut;
pub use stepper::{StepperCommand, StepperHandle, StepperSettings};
pub use tick::{PacerSettings, TickPacer, TickStats};
