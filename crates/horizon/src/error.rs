//! # Application Error Types
//!
//! Only configuration mistakes and fatal engine construction failures
//! surface here. Everything else degrades inside the lower crates.

use horizon_engine::EngineError;
use horizon_perf::PerfError;
use horizon_physics::ConfigError;
use thiserror::Error;

/// Errors surfaced to the application.
#[derive(Error, Debug)]
pub enum HorizonError {
    /// Mass / spin rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Engine could not be built.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Perf controller misuse or bad settings.
    #[error(transparent)]
    Perf(#[from] PerfError),

    /// Malformed TOML.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Well-formed TOML with out-of-range values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization failure.
    #[error("failed to serialize: {0}")]
    Serialize(String),

    /// File access failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for HorizonError {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e.to_string())
    }
}

impl From<toml::ser::Error> for HorizonError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialize(e.to_string())
    }
}

/// Result type for application operations.
pub type HorizonResult<T> = Result<T, HorizonError>;
