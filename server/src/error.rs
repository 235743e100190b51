//! Server error types using thiserror 2.0.

use std::io;
use thiserror::Error;

/// Errors raised while running an HTTP server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listener could not bind its address
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The accept loop failed
    #[error("Server error: {0}")]
    Serve(#[source] io::Error),

    /// Signal handlers could not be installed
    #[error("Failed to install signal handler: {0}")]
    Signal(#[source] io::Error),

    /// A server task panicked or was cancelled
    #[error("Server task failed: {0}")]
    Task(String),

    /// Configuration value is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// Create a bind error.
    #[must_use]
    pub fn bind(addr: impl Into<String>, source: io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    /// Create a task error.
    #[must_use]
    pub fn task(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
