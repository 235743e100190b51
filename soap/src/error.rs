//! SOAP error types using thiserror 2.0.
//!
//! Separates protocol faults returned by the remote service from transport
//! failures and malformed messages, so callers can tell a rejected request
//! from one that never completed.

use crate::envelope::Fault;
use reqwest::StatusCode;
use svc_common::TransportError;
use thiserror::Error;

/// SOAP-specific errors.
#[derive(Error, Debug)]
pub enum SoapError {
    /// The transport could not complete the round trip
    #[error("Error making SOAP request to {url}: {source}")]
    Transport {
        /// Target endpoint
        url: String,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// The endpoint answered with a status other than 200
    #[error("Soap call returned status {status}")]
    Status {
        /// Status returned by the endpoint
        status: StatusCode,
    },

    /// The endpoint answered with a SOAP Fault
    #[error(transparent)]
    Fault(#[from] Fault),

    /// The Body carried more than one child element
    #[error("Found multiple elements inside SOAP body; not wrapped-document/literal WS-I compliant")]
    MultipleBodyElements,

    /// The document root is not a SOAP 1.1 Envelope
    #[error("Missing SOAP Envelope element")]
    MissingEnvelope,

    /// The Envelope has no Body
    #[error("Missing SOAP Body element")]
    MissingBody,

    /// The XML could not be read or written
    #[error("XML error: {0}")]
    Xml(String),

    /// A payload could not be mapped to or from XML
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The endpoint URL is not valid
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value is not valid HTTP
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// Result type for SOAP operations.
pub type SoapResult<T> = Result<T, SoapError>;

impl SoapError {
    /// Create an XML error.
    #[must_use]
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create an invalid header error.
    #[must_use]
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// Create a transport error for the given endpoint.
    #[must_use]
    pub fn transport(url: impl Into<String>, source: impl Into<TransportError>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Create a status error.
    #[must_use]
    pub const fn status(status: StatusCode) -> Self {
        Self::Status { status }
    }

    /// Check if the remote service answered with a SOAP Fault.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    /// The SOAP Fault, if this error carries one.
    #[must_use]
    pub const fn fault(&self) -> Option<&Fault> {
        match self {
            Self::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}
