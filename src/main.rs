mod auth;
mod cli;
mod config;
mod error;
mod model;
mod output;
mod providers;
mod telemetry;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting runlens - CI/CD Run Trace & Metrics Exporter");
    cli.execute().await?;

    Ok(())
}
