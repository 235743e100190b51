//! `secret-file-encoder` binary.

use anyhow::Context;
use clap::Parser;
use secret_file_encoder::{Args, run};
use svc_common::{Level, LoggingConfig, init_logging};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(
        &LoggingConfig::default()
            .with_service_name("secret-file-encoder")
            .with_level(Level::Info),
    )?;

    let output = run(&args).context("FAILED TO WRITE SECRET FILE")?;
    println!("Secret file written to {}", output.display());
    Ok(())
}
