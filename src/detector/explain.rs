//! Field explanation for flagged rows
//!
//! Ranks features by how far a row sits from the batch's own per-column
//! mean, in population-standard-deviation units. This is an MVP heuristic
//! for "which fields look off", not a causal attribution, and makes no
//! claim of agreement with formal feature-importance methods.

use ndarray::Array1;

use crate::data::{FeatureMatrix, FEATURES, N_FEATURES};

/// Division guard for constant columns
const STD_EPSILON: f64 = 1e-9;

/// Maximum number of field names reported per anomaly
const TOP_FIELDS: usize = 2;

/// Precomputed per-column batch statistics, shared across all flagged rows
#[derive(Debug, Clone)]
pub struct BatchStats {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl BatchStats {
    pub fn from_matrix(matrix: &FeatureMatrix) -> Self {
        Self {
            means: matrix.column_means(),
            stds: matrix.column_stds(),
        }
    }

    /// Top suspicious field names for a row, most-to-least, ties broken by
    /// feature declaration order.
    pub fn explain_row(&self, matrix: &FeatureMatrix, row: usize) -> Vec<String> {
        let values = matrix.values().row(row);

        let mut ranked: Vec<(usize, f64)> = (0..N_FEATURES)
            .map(|col| {
                let z = (values[col] - self.means[col]) / (self.stds[col] + STD_EPSILON);
                (col, z.abs())
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        ranked
            .into_iter()
            .take(TOP_FIELDS)
            .map(|(col, _)| FEATURES[col].to_string())
            .collect()
    }
}
