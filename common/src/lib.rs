//! Shared library for cross-cutting concerns in backend Rust services.
//!
//! This crate provides centralized implementations for:
//! - Error types and the detailed [`ErrorLog`] record
//! - The logging façade ([`LogSink`], [`Logger`]) and subscriber setup
//! - The [`RequestClient`] transport seam, HTTP client building and a
//!   file-replaying mock transport
//! - Lenient date parsing and business-day arithmetic
//! - Path resolution, query formatting and strict JSON overlay decoding

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod datetime;
pub mod error;
pub mod error_log;
pub mod http;
pub mod logging;
pub mod path;
pub mod transform;
pub mod url;
pub mod utils;

pub use error::{CommonError, CommonResult, TransportError};
pub use error_log::ErrorLog;
pub use http::{HttpConfig, MockFileClient, RequestClient, build_http_client};
pub use logging::{Level, LogSink, Logger, LoggingConfig, init_logging};
pub use utils::StopWatch;
