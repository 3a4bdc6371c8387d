//! CSV ingestion for metric batches
//!
//! Expected header: `ts,cpu,ram,disk,latency_ms` (extra columns are
//! ignored). Header and value validation happens here, before the detection
//! core is ever invoked.

use std::io::Read;
use std::path::Path;

use crate::data::MetricPoint;
use crate::error::{MetricsenseError, Result};

/// Columns that must be present in the header
pub const REQUIRED_COLUMNS: [&str; 5] = ["ts", "cpu", "ram", "disk", "latency_ms"];

/// Read a batch of metric points from a CSV file.
pub fn read_csv_file(path: &Path) -> Result<Vec<MetricPoint>> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Read a batch of metric points from any CSV source.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<MetricPoint>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(MetricsenseError::Schema(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut points = Vec::new();
    for (line, record) in csv_reader.deserialize::<MetricPoint>().enumerate() {
        let point = record.map_err(|e| {
            MetricsenseError::Schema(format!("row {}: {e}", line + 1))
        })?;
        points.push(point);
    }
    Ok(points)
}
