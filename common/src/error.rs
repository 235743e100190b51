//! Centralized error types for the shared library.
//!
//! Every fallible helper in this crate returns [`CommonError`]. Transport
//! failures from [`crate::http::RequestClient`] implementations use the
//! narrower [`TransportError`] so callers can wrap them with request context.

use thiserror::Error;

/// Common error type for shared library operations.
#[derive(Error, Debug)]
pub enum CommonError {
    /// JSON could not be parsed or did not match the target shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decoded JSON carried a key the target does not have
    #[error("Unknown field in JSON input: {path}")]
    UnknownField {
        /// Dotted path of the offending key
        path: String,
    },

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record carried an unset date where one is required
    #[error("Invalid time bound: {0}")]
    InvalidTimeBound(String),

    /// Logging could not be configured
    #[error("Logging configuration error: {0}")]
    Logging(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for shared library operations.
pub type CommonResult<T> = Result<T, CommonError>;

impl CommonError {
    /// Create an unknown field error for the given dotted path.
    #[must_use]
    pub fn unknown_field(path: impl Into<String>) -> Self {
        Self::UnknownField { path: path.into() }
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid time bound error with the given message.
    #[must_use]
    pub fn invalid_time_bound(msg: impl Into<String>) -> Self {
        Self::InvalidTimeBound(msg.into())
    }

    /// Create a logging configuration error with the given message.
    #[must_use]
    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}

/// Errors raised while exchanging a request with a [`crate::http::RequestClient`].
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP stack failed (connect, TLS, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A local resource backing the transport could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The response could not be assembled
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Create an invalid response error with the given message.
    #[must_use]
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CommonError::unknown_field("server.port");
        assert_eq!(err.to_string(), "Unknown field in JSON input: server.port");

        let err = CommonError::invalid_input("empty");
        assert_eq!(err.to_string(), "Invalid input: empty");
    }

    #[test]
    fn test_transport_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing fixture");
        let err: TransportError = io.into();
        assert!(matches!(err, TransportError::Io(_)));
        assert_eq!(err.to_string(), "IO error: missing fixture");
    }
}
