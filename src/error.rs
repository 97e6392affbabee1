//! Error types for playlist-dl
//!
//! Request-time failures (bad input, extraction) fail the triggering call and
//! leave the registry untouched. Task-time failures (fetch) are absorbed by the
//! worker and only ever surface as a task in the `error` state.
//!
//! This module also provides:
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for playlist-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for playlist-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input URL or query parameter
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The extractor could not turn the input URL into media entries
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "min_refresh")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External tool could not be located or executed
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress - not accepting new tasks
    #[error("shutdown in progress: not accepting new tasks")]
    ShuttingDown,
}

/// Failures while expanding an input URL
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Playlist mode was requested but the response has no entries collection
    #[error("{url} is not a playlist")]
    NotAPlaylist {
        /// The input URL
        url: String,
    },

    /// The extractor process failed or could not be started
    #[error("extractor failed for {url}: {reason}")]
    ToolFailed {
        /// The input URL
        url: String,
        /// Captured failure reason
        reason: String,
    },

    /// The extractor produced output that could not be understood
    #[error("unreadable extractor output for {url}: {reason}")]
    InvalidOutput {
        /// The input URL
        url: String,
        /// Parse failure description
        reason: String,
    },
}

/// Failures while fetching one task's media
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetcher process ran and reported failure
    #[error("fetch of {source_url} failed: {reason}")]
    ToolFailed {
        /// The task's source URL
        source_url: String,
        /// Captured failure reason
        reason: String,
    },

    /// The fetcher process could not be started
    #[error("failed to start fetcher: {reason}")]
    Spawn {
        /// Why the process could not be spawned
        reason: String,
    },
}

/// Failures delivering a snapshot to a stream observer
#[derive(Debug, Error)]
pub enum StreamDeliveryError {
    /// The observer went away
    #[error("observer disconnected")]
    Closed,

    /// Writing to the observer failed
    #[error("failed to send snapshot: {0}")]
    Send(String),

    /// The snapshot could not be encoded
    #[error("failed to encode snapshot: {0}")]
    Encode(String),
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_a_playlist",
///     "message": "extraction error: https://example.com/watch?v=1 is not a playlist",
///     "details": {
///       "url": "https://example.com/watch?v=1"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "invalid_input", "extraction_failed")
    ///
    /// Clients can use this for programmatic error handling.
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("invalid_input", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the caller's input could not be turned into tasks
            Error::InvalidInput(_) => 400,
            Error::Extraction(_) => 400,
            Error::Config { .. } => 400,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
            Error::ExternalTool(_) => 503,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::Extraction(e) => match e {
                ExtractionError::NotAPlaylist { .. } => "not_a_playlist",
                ExtractionError::ToolFailed { .. } => "extraction_failed",
                ExtractionError::InvalidOutput { .. } => "invalid_extractor_output",
            },
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Extraction(ExtractionError::NotAPlaylist { url })
            | Error::Extraction(ExtractionError::ToolFailed { url, .. })
            | Error::Extraction(ExtractionError::InvalidOutput { url, .. }) => {
                Some(serde_json::json!({ "url": url }))
            }
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        Self {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
