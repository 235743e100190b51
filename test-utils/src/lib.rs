//! Shared test utilities for the service libraries.
//!
//! This crate provides:
//! - Proptest generators for SOAP payloads, dates and paths
//! - Recording and canned implementations of the logging and transport seams
//! - Test fixtures with sample SOAP documents

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
pub use mocks::{CannedClient, CapturedRequest, RecordedLog, RecordingSink};
