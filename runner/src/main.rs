//! Harmonizer runner binary.
//!
//! Loads layered configuration, applies command line overrides and runs one harmonization
//! of the configured sources on a multi-threaded runtime.

use std::process::ExitCode;

use clap::Parser;
use harmonizer_config::shared::HarmonizerConfig;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, load_harmonizer_config};
use crate::core::start_harmonizer_with_config;
use crate::error::{RunnerError, RunnerResult};

mod config;
mod core;
mod error;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", err.render_report());
            ExitCode::FAILURE
        }
    }
}

fn run() -> RunnerResult<()> {
    let args = Args::parse();

    // Load the configuration before logging is up so that a bad file is reported plainly.
    let config = load_harmonizer_config(&args)?;

    init_tracing()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(config))
}

async fn async_main(config: HarmonizerConfig) -> RunnerResult<()> {
    if let Err(err) = start_harmonizer_with_config(config).await {
        error!("{err}");
        return Err(err);
    }

    Ok(())
}

fn init_tracing() -> RunnerResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| RunnerError::from(std::io::Error::other(err)))
}
