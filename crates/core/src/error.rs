//! Error types for docqa.
//!
//! One enum covers every failure the pipeline can surface to a caller:
//! bad parameters, upstream provider failures, querying before ingestion,
//! template mistakes, and the I/O that surrounds document loading.

use thiserror::Error;

/// Unified error type for docqa.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad parameters: zero top-k, overlap >= chunk size, dimension mismatch,
    /// unreadable config. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Embedding or completion provider failure, including transport errors
    /// and timeouts. `status` carries the upstream HTTP status when one exists.
    #[error("Provider error{}: {message}", status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Provider {
        status: Option<u16>,
        message: String,
    },

    /// A query arrived before any successful ingestion.
    #[error("Not ready: {0}")]
    NotReady(String),

    /// A prompt template referenced a placeholder with no value, or is malformed.
    #[error("Template error: {0}")]
    Template(String),

    /// Ingestion produced no chunks at all.
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// A document could not be loaded or extracted.
    #[error("Document error: {0}")]
    Document(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Provider error without an upstream status (transport, decode, timeout).
    pub fn provider(message: impl Into<String>) -> Self {
        AppError::Provider {
            status: None,
            message: message.into(),
        }
    }

    /// Provider error carrying the upstream HTTP status.
    pub fn provider_status(status: u16, message: impl Into<String>) -> Self {
        AppError::Provider {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Whether this error means "no documents yet" rather than a failure.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, AppError::NotReady(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display_with_status() {
        let err = AppError::provider_status(429, "rate limited");
        assert_eq!(err.to_string(), "Provider error (429): rate limited");
    }

    #[test]
    fn test_provider_error_display_without_status() {
        let err = AppError::provider("connection reset");
        assert_eq!(err.to_string(), "Provider error: connection reset");
    }

    #[test]
    fn test_not_ready_is_distinct() {
        assert!(AppError::NotReady("no index".to_string()).is_not_ready());
        assert!(!AppError::Ingest("no chunks".to_string()).is_not_ready());
    }
}
