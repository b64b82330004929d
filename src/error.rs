//! Error types shared by the pipeline stages.

use thiserror::Error;

// ---

/// Failure taxonomy for the ingest, training and forecast stages.
///
/// Variants map one-to-one onto the stage contracts: per-row problems are
/// skipped before these errors are raised, so any `PipelineError` aborts the
/// current stage run. A failed run never touches previously persisted
/// artifacts (the registry is append-only).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The upstream source (API or store) returned no usable data.
    #[error("no source data available: {reason}")]
    DataUnavailable { reason: String },

    /// Too few usable rows remained after lag derivation and filtering.
    #[error("insufficient training data: {got} usable rows, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    /// Every candidate model failed to fit or score.
    #[error("all candidate models failed; no artifact written")]
    TrainingFailed,

    /// Forecast input violated the strictly-increasing timestamp precondition.
    #[error("weather input is not in strictly increasing timestamp order at index {index}")]
    UnorderedInput { index: usize },

    /// The model rejected a feature vector or has not been fitted.
    #[error("model prediction failed: {reason}")]
    Prediction { reason: String },

    /// A store read or write failed.
    #[error("store operation failed: {reason}")]
    Persistence { reason: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// ---

impl From<sqlx::Error> for PipelineError {
    fn from(e: sqlx::Error) -> Self {
        PipelineError::Persistence {
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Persistence {
            reason: format!("artifact serialization: {e}"),
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::DataUnavailable {
            reason: e.to_string(),
        }
    }
}
