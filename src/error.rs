//! Error types for the mangascore pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, MangaError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum MangaError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<polars::error::PolarsError> for MangaError {
    fn from(err: polars::error::PolarsError) -> Self {
        MangaError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for MangaError {
    fn from(err: serde_json::Error) -> Self {
        MangaError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for MangaError {
    fn from(err: ndarray::ShapeError) -> Self {
        MangaError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
