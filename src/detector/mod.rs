//! Anomaly detection pipeline
//!
//! `detect` is a pure function over a batch: build the feature matrix, grow
//! a fresh isolation forest, score every row, flag the contamination-driven
//! top slice, and explain each flagged row. The forest lives only for the
//! duration of the call.

pub mod explain;
pub mod isolation_forest;
pub mod threshold;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{FeatureMatrix, MetricPoint};
use crate::error::Result;
use explain::BatchStats;
use isolation_forest::IsolationForest;

/// Detection parameters, passed by value into each call.
///
/// Carrying the seed here (rather than an ambient generator) is what makes
/// two calls with the same batch and config bit-for-bit identical.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Expected fraction of anomalous points, within [0.01, 0.30]
    pub contamination: f64,
    /// Seed for all subsampling and split choices
    pub seed: u64,
    /// Ensemble size
    pub n_trees: usize,
    /// Subsample size per tree (capped at the batch size)
    pub max_samples: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            seed: 42,
            n_trees: 200,
            max_samples: 256,
        }
    }
}

impl DetectorConfig {
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A batch point with its score and anomaly flag
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPoint {
    pub point: MetricPoint,
    /// Higher = more anomalous
    pub score: f64,
    pub is_anomaly: bool,
}

/// Explanation record for one flagged point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub ts: String,
    pub score: f64,
    /// Most-to-least suspicious field names, at most two
    pub fields: Vec<String>,
    pub note: String,
}

/// Full result of one detection call
#[derive(Debug, Clone)]
pub struct Detection {
    pub total_points: usize,
    /// Every batch point in caller order
    pub scored: Vec<ScoredPoint>,
    /// Flagged points only, sorted by score descending
    pub anomalies: Vec<AnomalyRecord>,
}

/// Score a batch and flag its anomalous subset.
///
/// Validation happens before any tree is built: an out-of-range
/// contamination or an empty batch rejects the call outright.
pub fn detect(points: &[MetricPoint], config: &DetectorConfig) -> Result<Detection> {
    threshold::validate_contamination(config.contamination)?;

    let matrix = FeatureMatrix::from_points(points)?;

    let forest = IsolationForest::fit(
        matrix.values(),
        config.n_trees,
        config.max_samples,
        config.seed,
    );
    let scores = forest.score(matrix.values());
    debug!(
        n_points = points.len(),
        n_trees = forest.n_trees(),
        subsample_size = forest.subsample_size(),
        "Forest built and scored"
    );

    let flags = threshold::flag_anomalies(&scores, config.contamination)?;

    let stats = BatchStats::from_matrix(&matrix);
    let mut anomalies: Vec<(usize, AnomalyRecord)> = Vec::new();
    for (idx, flagged) in flags.iter().enumerate() {
        if !flagged {
            continue;
        }
        let fields = stats.explain_row(&matrix, idx);
        anomalies.push((
            idx,
            AnomalyRecord {
                ts: points[idx].ts.clone(),
                score: scores[idx],
                note: format!("Unusual behavior detected. Check: {}", fields.join(", ")),
                fields,
            },
        ));
    }
    // Score descending; equal scores keep batch order
    anomalies.sort_by(|a, b| {
        b.1.score
            .partial_cmp(&a.1.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let scored = points
        .iter()
        .zip(scores.iter().zip(flags.iter()))
        .map(|(point, (&score, &is_anomaly))| ScoredPoint {
            point: point.clone(),
            score,
            is_anomaly,
        })
        .collect();

    Ok(Detection {
        total_points: points.len(),
        scored,
        anomalies: anomalies.into_iter().map(|(_, record)| record).collect(),
    })
}
