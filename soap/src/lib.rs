//! SOAP 1.1 envelope codec and client.
//!
//! # Features
//! - Envelope encoding with optional header items
//! - Strict decoding of wrapped document/literal replies, surfacing Faults
//!   as errors
//! - A client posting envelopes over any [`svc_common::RequestClient`]
//! - WS-Security `UsernameToken` headers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod security;

pub use client::{DEFAULT_USER_AGENT, SOAP_CONTENT_TYPE, SoapClient};
pub use config::{BasicAuth, ClientOptions};
pub use envelope::{Body, Envelope, Fault, Header, XmlFragment, decode, decode_into};
pub use error::{SoapError, SoapResult};
pub use security::{UsernameToken, WsSecurityHeader};
