//! Error types for the fan-out/fan-in pipeline.

use thiserror::Error;

/// A conservation invariant that failed after the pipeline drained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// The sink saw a different number of items than the source produced
    #[error("item counts differ: source {produced} != sink {drained}")]
    CountMismatch { produced: u64, drained: u64 },

    /// The sink summed to a different total than the source produced
    #[error("item sums differ: source {produced} != sink {drained}")]
    SumMismatch { produced: i64, drained: i64 },

    /// The per-lane hit counters do not add up to the source count
    #[error("lane hits do not partition the source: lanes {lanes} != source {produced}")]
    LanePartition { lanes: u64, produced: u64 },
}

/// The main error type for the pipeline.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A conservation check failed; the pipeline itself is defective
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] Violation),

    /// The pipeline configuration cannot be run
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A lane was sent to after its consumer went away
    #[error("Channel was closed unexpectedly")]
    ChannelClosed,

    /// A stage task panicked or was aborted before it could be joined
    #[error("stage task failed: {0}")]
    TaskFailed(String),

    /// Quiescence was not reached within the shutdown window
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

impl Error {
    /// Create a configuration error with a message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Create a timeout error
    pub fn timeout(duration_ms: u64) -> Self {
        Error::Timeout { duration_ms }
    }

    /// Whether this error proves a correctness defect rather than a setup problem
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Error::InvariantViolation(_))
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Error::ChannelClosed
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TaskFailed(err.to_string())
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;
