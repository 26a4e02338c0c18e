//! `registry-client` entry point: loads settings, wires the context, runs one
//! command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use registry_client::inbound::cli::{self, Cli, CliError};
use registry_client::{ClientContext, ClientSettings};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Cli::parse();
    let settings = ClientSettings::load_from_env().wrap_err("failed to read settings")?;
    let context = ClientContext::from_settings(&settings).wrap_err("failed to build client")?;

    let outcome = cli::run(args.command, &context, io::stdout().lock()).await;
    context.shutdown();
    match outcome {
        // The report on stdout already carries the failure.
        Err(CliError::Command(error)) => {
            warn!(code = ?error.code(), %error, "command failed");
            std::process::exit(1);
        }
        other => other.wrap_err("failed to print command report"),
    }
}
