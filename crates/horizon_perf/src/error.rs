//! # Perf Error Types

use thiserror::Error;

/// Errors from the performance controllers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerfError {
    /// `start()` while a session is active.
    #[error("benchmark already running")]
    BenchmarkAlreadyRunning,

    /// `cancel()` without an active session.
    #[error("no benchmark is running")]
    BenchmarkNotRunning,

    /// A benchmark needs at least one preset.
    #[error("benchmark preset queue is empty")]
    EmptyPresetQueue,

    /// Controller or monitor settings out of range.
    #[error("invalid controller configuration: {0}")]
    InvalidControllerConfig(String),
}

/// Result type for perf operations.
pub type PerfResult<T> = Result<T, PerfError>;
