use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use iqama_schedule::{
    api::AdhanApiClient,
    config::{AppConfig, IqamaConfig},
    engine::IqamaScheduleBuilder,
    export,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "iqama-schedule")]
#[command(about = "Builds a yearly iqama schedule from published adhan times")]
struct Args {
    /// Address to query the timing provider for (overrides config)
    #[arg(long)]
    address: Option<String>,

    /// Year to build the schedule for (overrides config)
    #[arg(long)]
    year: Option<i32>,

    /// Where to write the schedule CSV (overrides config)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("iqama_schedule=debug");

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(address) = args.address {
        config.query.address = address;
    }
    if let Some(year) = args.year {
        config.query.year = year;
    }

    let iqama_config = IqamaConfig::new(&config.query, &config.iqama)
        .context("Invalid iqama configuration")?;
    let client = AdhanApiClient::new(config.provider.base_url.clone(), &config.network)
        .context("Failed to create API client")?;
    let builder = IqamaScheduleBuilder::new(iqama_config, client);

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let schedule = rt
        .block_on(builder.execute())
        .context("Failed to build iqama schedule")?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.csv_path));
    export::write_csv(&schedule, &output)
        .with_context(|| format!("Failed to write schedule to {}", output.display()))?;
    tracing::info!("Wrote {} days to {}", schedule.len(), output.display());

    Ok(())
}
