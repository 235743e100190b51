//! HTTP server bootstrap for backend Rust services.
//!
//! # Features
//! - Graceful shutdown on SIGINT/SIGTERM with in-flight request draining
//! - Readiness and liveness handlers backed by owned atomic flags
//! - JSON content-type middleware
//! - Environment-driven server configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod health;
pub mod middleware;

pub use bootstrap::{GracefulServer, Signal, StopEvent, StopHandle, listen_and_serve};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use health::{HealthFlag, atomic_handler, register_readiness_liveness};
pub use middleware::json_content_type;
