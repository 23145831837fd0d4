//! Core error types for Arca

use thiserror::Error;

/// Main error type for Arca operations
#[derive(Error, Debug)]
pub enum ArcaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for Arca operations
pub type ArcaResult<T> = Result<T, ArcaError>;

// Conversion implementations for common error types
impl From<serde_json::Error> for ArcaError {
    fn from(err: serde_json::Error) -> Self {
        ArcaError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ArcaError {
    fn from(err: toml::de::Error) -> Self {
        ArcaError::Configuration(err.to_string())
    }
}

impl From<toml::ser::Error> for ArcaError {
    fn from(err: toml::ser::Error) -> Self {
        ArcaError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for ArcaError {
    fn from(err: anyhow::Error) -> Self {
        ArcaError::Other(err.to_string())
    }
}
