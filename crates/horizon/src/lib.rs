//! # HORIZON
//!
//! Real-time black hole physics with an adaptive performance layer.
//!
//! ## Crates
//!
//! ```text
//! horizon_physics   closed-form Kerr quantities, disk model, blackbody
//!        │
//! horizon_core      seqlock'd shared region (CAMERA / PHYSICS / CONTROL / LUT)
//!        │
//! horizon_engine    PhysicsEngine, stepper thread, PhysicsBridge
//!        │
//! horizon_perf      monitor, PID resolution, presets, benchmark
//!        │
//! horizon (this)    SimulationContext, config, preferences, headless driver
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use horizon::{HorizonConfig, SimulationContext, UiCommand};
//! use horizon_engine::Capabilities;
//!
//! # fn main() -> horizon::HorizonResult<()> {
//! let config = HorizonConfig::default();
//! let mut ctx = SimulationContext::new(&config, None, Capabilities::detect())?;
//! ctx.handle(UiCommand::Orbit { dtheta: 0.1, dphi: 0.0, dzoom: 0.0 })?;
//! let frame = ctx.frame(16.6);
//! println!("horizon at {}", frame.snapshot.physics.event_horizon);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod context;
pub mod error;
pub mod preferences;

pub use config::{BlackHoleSection, HorizonConfig, RenderSection, StepperSection};
pub use context::{FrameOutput, SimulationContext, UiCommand};
pub use error::{HorizonError, HorizonResult};
pub use preferences::Preferences;
