//! # Configuration Errors
//!
//! Raised only at the input boundary. The kernel itself never fails.

use thiserror::Error;

/// Errors produced when validating a black hole configuration.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Mass was zero or negative.
    #[error("mass must be positive, got {0}")]
    NonPositiveMass(f64),

    /// Dimensionless spin outside `[-1, 1]`.
    #[error("spin must lie in [-1, 1], got {0}")]
    SpinOutOfRange(f64),

    /// A parameter was NaN or infinite.
    #[error("parameter `{0}` is not finite")]
    NonFinite(&'static str),
}

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;
