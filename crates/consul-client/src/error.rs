//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload was valid JSON but not of the shape the endpoint returns.
    #[error("Unexpected payload shape: expected {expected}")]
    UnexpectedShape {
        /// Description of the expected JSON shape.
        expected: &'static str,
    },

    /// A single-object payload was missing required fields.
    #[error("Failed to decode {model} from response")]
    Decode {
        /// Name of the model being decoded.
        model: &'static str,
    },

    /// Resource not found (HTTP 404).
    ///
    /// Carries the request path, followed by Consul's message when it sent
    /// one. KV misses come back with an empty body.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Consul returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, which Consul sends as plain text.
        message: String,
    },

    /// A path segment was `.` or `..`, which HTTP path normalisation would
    /// collapse into a different resource.
    #[error("Invalid path segment '{0}'")]
    InvalidPathSegment(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The blocking runtime could not be started.
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// Check if the payload could not be turned into the requested model.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::Json(_) | Error::UnexpectedShape { .. } | Error::Decode { .. }
        )
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
