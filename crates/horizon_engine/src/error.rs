//! # Engine Error Types
//!
//! Torn reads and non-finite snapshots are not errors; the bridge recovers
//! from them silently. Only a failure to build the engine reaches callers.

use horizon_physics::ConfigError;
use thiserror::Error;

/// Errors surfaced by the engine and the bridge.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Mass or spin rejected at the input boundary.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// Engine settings out of range.
    #[error("invalid engine settings: {0}")]
    InvalidSettings(String),

    /// The stepper thread could not be started.
    #[error("failed to spawn physics stepper: {0}")]
    StepperSpawn(String),

    /// The stepper thread started but could not build its engine.
    #[error("physics stepper failed to initialize: {0}")]
    StepperInitFailed(String),

    /// The bridge was shut down.
    #[error("physics bridge has been terminated")]
    Terminated,
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
