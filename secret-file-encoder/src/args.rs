//! Command line arguments.

use crate::error::{EncoderError, EncoderResult};
use clap::Parser;
use std::path::PathBuf;

/// Encode a service config file into a Kubernetes Secret manifest.
#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
pub struct Args {
    /// Secret API version
    #[arg(long = "version", default_value = "v1")]
    pub api_version: String,

    /// Project name, used as the secret name
    #[arg(short = 'p')]
    pub project: Option<String>,

    /// Config file to encode
    #[arg(short = 'i')]
    pub input: Option<PathBuf>,

    /// Output file
    #[arg(short = 'o', default_value = "secret.yaml")]
    pub output: PathBuf,

    /// Secret namespace
    #[arg(long, default_value = "CodeNamor")]
    pub namespace: String,
}

/// Arguments with every required value present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    /// Secret API version
    pub api_version: String,
    /// Secret name
    pub project: String,
    /// Config file to encode
    pub input: PathBuf,
    /// Output file
    pub output: PathBuf,
    /// Secret namespace
    pub namespace: String,
}

impl Args {
    /// Check the required flags, reporting every missing one at once.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::Invalid`] listing each missing flag.
    pub fn validate(&self) -> EncoderResult<Validated> {
        let mut problems = Vec::new();
        let project = self
            .project
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        if project.is_none() {
            problems.push("project name is required (-p)".to_string());
        }
        let input = self.input.as_ref().filter(|i| !i.as_os_str().is_empty());
        if input.is_none() {
            problems.push("input file is required (-i)".to_string());
        }

        match (project, input) {
            (Some(project), Some(input)) => Ok(Validated {
                api_version: self.api_version.clone(),
                project: project.to_string(),
                input: input.clone(),
                output: self.output.clone(),
                namespace: self.namespace.clone(),
            }),
            _ => Err(EncoderError::Invalid(problems)),
        }
    }
}
