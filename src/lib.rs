//! metricsense - Metrics batch anomaly detection
//!
//! Flags unusual multivariate metric samples (cpu, ram, disk, latency)
//! inside a batch, scores each point's abnormality, and explains which
//! fields drove the flag.
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - Metric points and the fixed-order feature matrix
//! - [`detector`] - Isolation forest scoring, thresholding, explanations
//!
//! ## IO
//! - [`ingest`] - CSV batch ingestion with schema validation
//! - [`synthetic`] - Seeded synthetic metric generation
//! - [`storage`] - Run history persistence (SQLite)
//!
//! ## Services
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface
//!
//! Each detection call builds its own forest from scratch and discards it
//! after scoring; there is no cross-batch model state anywhere in the
//! crate.

pub mod error;

pub mod data;
pub mod detector;

pub mod ingest;
pub mod storage;
pub mod synthetic;

pub mod cli;
pub mod server;

pub use error::{MetricsenseError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{MetricPoint, FEATURES};
    pub use crate::detector::{detect, AnomalyRecord, Detection, DetectorConfig, ScoredPoint};
    pub use crate::error::{MetricsenseError, Result};
    pub use crate::storage::{Database, RunSummary};
}
