//! Error types for the cofilter rating predictor
//!
//! This module provides structured error handling using thiserror. Only
//! storage-level failures are fatal to a batch run; per-record anomalies are
//! recovered by the caller and never escape a prediction.

use thiserror::Error;

/// Main error type for cofilter operations
#[derive(Error, Debug)]
pub enum CofilterError {
    /// Rating store could not be reached or failed a query
    #[error("Rating store unavailable: {0}")]
    StoreUnavailable(String),

    /// Rating record is missing a field or carries an out-of-range value
    #[error("Malformed rating record: {0}")]
    MalformedRecord(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration loaded but failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A prediction task panicked or was cancelled
    #[error("Prediction task failed: {0}")]
    TaskFailed(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for cofilter operations
pub type Result<T> = std::result::Result<T, CofilterError>;

/// Convert anyhow::Error to CofilterError
impl From<anyhow::Error> for CofilterError {
    fn from(err: anyhow::Error) -> Self {
        CofilterError::Other(err.to_string())
    }
}

impl From<libsql::Error> for CofilterError {
    fn from(err: libsql::Error) -> Self {
        CofilterError::StoreUnavailable(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CofilterError {
    fn from(err: tokio::task::JoinError) -> Self {
        CofilterError::TaskFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CofilterError::StoreUnavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Rating store unavailable: connection refused");

        let err = CofilterError::MalformedRecord("missing item_id".to_string());
        assert_eq!(err.to_string(), "Malformed rating record: missing item_id");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ not json");
        assert!(json_err.is_err());

        let err: CofilterError = json_err.unwrap_err().into();
        assert!(matches!(err, CofilterError::Serialization(_)));

        let err: CofilterError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, CofilterError::Other(ref msg) if msg == "boom"));
    }
}
