//! metricsense - Main entry point
//!
//! Metrics anomaly detection service with CLI and server modes.

use clap::Parser;
use metricsense::cli::{cmd_detect, cmd_sample, cmd_serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metricsense=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, db } => {
            cmd_serve(&host, port, &db).await?;
        }
        Commands::Detect {
            data,
            contamination,
            seed,
            db,
        } => {
            cmd_detect(&data, contamination, seed, db.as_deref())?;
        }
        Commands::Sample {
            points,
            interval,
            seed,
            output,
        } => {
            cmd_sample(points, interval, seed, &output)?;
        }
    }

    Ok(())
}
