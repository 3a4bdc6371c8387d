//! Command-line interface
//!
//! Three commands: run the HTTP server, score a CSV batch directly, or
//! generate a seeded synthetic sample CSV for demos.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::*;

use crate::detector::{detect, DetectorConfig};
use crate::server::{run_server, ServerConfig};
use crate::storage::Database;
use crate::{ingest, synthetic};

#[derive(Parser)]
#[command(name = "metricsense", version, about = "Metrics anomaly detection service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// SQLite database path for run history
        #[arg(long, default_value = "metricsense.db")]
        db: String,
    },
    /// Score a CSV batch and print the flagged anomalies
    Detect {
        /// CSV file with header ts,cpu,ram,disk,latency_ms
        data: PathBuf,
        #[arg(long, default_value_t = 0.05)]
        contamination: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Record the run into this SQLite database
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Generate a synthetic metrics CSV
    Sample {
        #[arg(long, default_value_t = 240)]
        points: usize,
        /// Seconds between consecutive timestamps
        #[arg(long, default_value_t = 60)]
        interval: i64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value = "sample_metrics.csv")]
        output: PathBuf,
    },
}

pub async fn cmd_serve(host: &str, port: u16, db: &str) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: host.to_string(),
        port,
        db_path: db.to_string(),
    };
    run_server(config).await
}

pub fn cmd_detect(
    data: &Path,
    contamination: f64,
    seed: u64,
    db: Option<&Path>,
) -> anyhow::Result<()> {
    let points = ingest::read_csv_file(data)?;
    let config = DetectorConfig::default()
        .with_contamination(contamination)
        .with_seed(seed);
    let detection = detect(&points, &config)?;

    println!(
        "  {} {} points scored, {} flagged (contamination {})",
        "✓".green(),
        detection.total_points,
        detection.anomalies.len().to_string().red(),
        contamination
    );
    for record in &detection.anomalies {
        println!(
            "    {}  score {:.4}  {}",
            record.ts.white(),
            record.score,
            record.fields.join(", ").yellow()
        );
    }

    if let Some(db_path) = db {
        let db = Database::open(db_path)?;
        let run_id = db.record_run(detection.total_points, &detection.anomalies)?;
        println!("  {} run recorded as id {run_id}", "✓".green());
    }

    Ok(())
}

pub fn cmd_sample(points: usize, interval: i64, seed: u64, output: &Path) -> anyhow::Result<()> {
    let batch = synthetic::make_sample_metrics(points, interval, seed);

    let mut writer = csv::Writer::from_path(output)?;
    for point in &batch {
        writer.serialize(point)?;
    }
    writer.flush()?;

    println!(
        "  {} wrote {} points to {} (seed {seed})",
        "✓".green(),
        batch.len(),
        output.display()
    );
    Ok(())
}
