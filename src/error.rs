//! Error types for the diabetes model pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, DiabetesError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum DiabetesError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl From<polars::error::PolarsError> for DiabetesError {
    fn from(err: polars::error::PolarsError) -> Self {
        DiabetesError::DataError(err.to_string())
    }
}

impl From<bincode::Error> for DiabetesError {
    fn from(err: bincode::Error) -> Self {
        DiabetesError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for DiabetesError {
    fn from(err: reqwest::Error) -> Self {
        DiabetesError::FetchError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DiabetesError {
    fn from(err: ndarray::ShapeError) -> Self {
        DiabetesError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
