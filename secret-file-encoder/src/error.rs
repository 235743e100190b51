//! Encoder error types using thiserror 2.0.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while producing a secret file.
#[derive(Error, Debug)]
pub enum EncoderError {
    /// One or more inputs were missing or empty
    #[error("invalid input: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// A file could not be read or written
    #[error("{action} {path}: {source}")]
    Io {
        /// What was attempted
        action: &'static str,
        /// File involved
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The manifest could not be rendered
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for encoder operations.
pub type EncoderResult<T> = Result<T, EncoderError>;

impl EncoderError {
    /// Create a read error.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action: "failed to read",
            path: path.into(),
            source,
        }
    }

    /// Create a write error.
    #[must_use]
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action: "failed to write",
            path: path.into(),
            source,
        }
    }

    /// The validation problems, if this is a validation error.
    #[must_use]
    pub fn problems(&self) -> &[String] {
        match self {
            Self::Invalid(problems) => problems,
            _ => &[],
        }
    }
}
