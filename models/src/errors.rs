// models/src/errors.rs

use std::io;
pub use thiserror::Error;
#[cfg(feature = "bincode-errors")]
use bincode::error::{DecodeError, EncodeError};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Training error: {0}")]
    TrainingError(String), // Error while fitting the model or splitting data
    #[error("Prediction error: {0}")]
    PredictionError(String), // Error while scoring a request against the model
    #[error("Serialization error: {0}")]
    SerializationError(String), // Error while writing artifacts
    #[error("Deserialization error: {0}")]
    DeserializationError(String), // Error while reading artifacts
    #[error("Artifact error: {0}")]
    ArtifactError(String), // Missing or unreadable artifact files

    #[error("artifact schema version mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: u32, found: u32 },
    #[error("unknown {field} value '{value}'")]
    UnknownCategory { field: String, value: String },

    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[cfg(feature = "bincode-errors")]
    #[error(transparent)]
    BincodeDecode(#[from] DecodeError),
    #[cfg(feature = "bincode-errors")]
    #[error(transparent)]
    BincodeEncode(#[from] EncodeError),
}

// Implement From for serde_json::Error to convert into SchedulerError variants.
impl From<serde_json::Error> for SchedulerError {
    fn from(err: serde_json::Error) -> Self {
        SchedulerError::SerializationError(format!("JSON processing error: {}", err))
    }
}

/// A request validation error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A numeric field is outside the range the model understands.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    /// A categorical field was submitted blank.
    #[error("{field} must not be empty")]
    EmptyCategory { field: &'static str },
}

/// A type alias for a `Result` that returns a `SchedulerError` on failure.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
