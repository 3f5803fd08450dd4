//! Binary crate for the `weather-alert` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Rendering human-friendly reports
//! - Notification delivery and schedule management

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod notify;
mod report;
mod schedule;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
