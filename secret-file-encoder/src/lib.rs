//! Encode a service config file into a Kubernetes `Secret` manifest.
//!
//! The config file is stored base64 encoded under `data."config.json"` of an
//! `Opaque` secret named after the project.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod args;
pub mod error;
pub mod secret;

pub use args::{Args, Validated};
pub use error::{EncoderError, EncoderResult};
pub use secret::{SecretFile, encode};

use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Validate `args`, encode the input file and write the manifest.
///
/// The output file is created or truncated. Returns the path written.
///
/// # Errors
///
/// - [`EncoderError::Invalid`] when flags are missing
/// - [`EncoderError::Io`] when the input cannot be read or the output
///   cannot be written
pub fn run(args: &Args) -> EncoderResult<PathBuf> {
    let args = args.validate()?;

    let config = fs::read(&args.input).map_err(|e| EncoderError::read(&args.input, e))?;
    debug!(input = %args.input.display(), bytes = config.len(), "read config file");

    let secret = SecretFile::new(
        args.api_version,
        args.namespace,
        args.project,
        encode(&config),
    )?;
    let yaml = secret.to_yaml()?;

    fs::write(&args.output, yaml).map_err(|e| EncoderError::write(&args.output, e))?;
    info!(
        output = %args.output.display(),
        name = %secret.metadata.name,
        namespace = %secret.metadata.namespace,
        "secret file written"
    );
    Ok(args.output)
}
