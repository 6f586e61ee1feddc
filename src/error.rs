//! Error taxonomy for the liability engine
//!
//! Every engine entry point returns [`Result`]. Validation failures are raised
//! at the entry of the offending call and are never clamped or defaulted.

use thiserror::Error;

/// Errors raised by the liability engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// A value lies outside its domain (negative cost/count, rate <= -1, NaN, ...)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Series supplied to one calculation do not share period indices
    #[error("Misaligned series: {0}")]
    MisalignedSeries(String),

    /// Empty collection, or a history shorter than a model's minimum
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A scenario with this name is already registered
    #[error("Duplicate scenario: {0}")]
    DuplicateScenario(String),

    /// No scenario with this name is registered
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// Too many simulation iterations failed
    #[error("Batch failure: {skipped} of {attempted} iterations failed (threshold {threshold:.2}%)")]
    BatchFailure {
        skipped: u64,
        attempted: u64,
        /// Threshold as a percentage
        threshold: f64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidParameter(message.into())
    }

    pub(crate) fn insufficient(message: impl Into<String>) -> Self {
        EngineError::InsufficientData(message.into())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EngineError>;
