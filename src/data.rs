//! Metric point batch representation and feature matrix construction

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{MetricsenseError, Result};

/// Feature columns, in the fixed order used across the whole pipeline.
///
/// This order is load-bearing: it defines the matrix column layout and the
/// names reported by the field explainer, so it must never be reordered.
pub const FEATURES: [&str; 4] = ["cpu", "ram", "disk", "latency_ms"];

/// Number of feature columns
pub const N_FEATURES: usize = FEATURES.len();

/// A single multivariate metric sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// ISO-8601 timestamp, not necessarily unique or sorted
    pub ts: String,
    pub cpu: f64,
    pub ram: f64,
    pub disk: f64,
    pub latency_ms: f64,
}

impl MetricPoint {
    /// Feature values in `FEATURES` order
    pub fn features(&self) -> [f64; N_FEATURES] {
        [self.cpu, self.ram, self.disk, self.latency_ms]
    }
}

/// Fixed-order numeric matrix over a batch, one row per point
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Build the n x 4 matrix for a batch.
    ///
    /// Fails with a schema error if any value is non-finite; the matrix
    /// itself has no notion of missing fields (the typed `MetricPoint`
    /// guarantees presence), but NaN/inf would silently poison every split
    /// comparison downstream.
    pub fn from_points(points: &[MetricPoint]) -> Result<Self> {
        if points.is_empty() {
            return Err(MetricsenseError::EmptyBatch);
        }

        let mut values = Array2::zeros((points.len(), N_FEATURES));
        for (row, point) in points.iter().enumerate() {
            for (col, value) in point.features().into_iter().enumerate() {
                if !value.is_finite() {
                    return Err(MetricsenseError::Schema(format!(
                        "non-numeric value for '{}' at batch position {}",
                        FEATURES[col], row
                    )));
                }
                values[[row, col]] = value;
            }
        }

        Ok(Self { values })
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Per-column mean over the whole batch
    pub fn column_means(&self) -> Array1<f64> {
        let n = self.values.nrows() as f64;
        self.values.sum_axis(ndarray::Axis(0)) / n
    }

    /// Per-column population standard deviation over the whole batch
    pub fn column_stds(&self) -> Array1<f64> {
        let means = self.column_means();
        let n = self.values.nrows() as f64;
        let mut variances = Array1::zeros(N_FEATURES);
        for row in self.values.rows() {
            for (col, value) in row.iter().enumerate() {
                let d = value - means[col];
                variances[col] += d * d;
            }
        }
        variances.mapv_inplace(|v: f64| (v / n).sqrt());
        variances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(cpu: f64, ram: f64, disk: f64, latency_ms: f64) -> MetricPoint {
        MetricPoint {
            ts: "2026-01-01T00:00:00".to_string(),
            cpu,
            ram,
            disk,
            latency_ms,
        }
    }

    #[test]
    fn test_matrix_shape_and_order() {
        let points = vec![point(1.0, 2.0, 3.0, 4.0), point(5.0, 6.0, 7.0, 8.0)];
        let matrix = FeatureMatrix::from_points(&points).unwrap();

        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.values()[[0, 0]], 1.0);
        assert_eq!(matrix.values()[[0, 3]], 4.0);
        assert_eq!(matrix.values()[[1, 2]], 7.0);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let err = FeatureMatrix::from_points(&[]).unwrap_err();
        assert!(matches!(err, MetricsenseError::EmptyBatch));
    }

    #[test]
    fn test_non_finite_rejected() {
        let points = vec![point(1.0, f64::NAN, 3.0, 4.0)];
        let err = FeatureMatrix::from_points(&points).unwrap_err();
        assert!(matches!(err, MetricsenseError::Schema(_)));
        assert!(err.to_string().contains("ram"));
    }

    #[test]
    fn test_column_stats() {
        let points = vec![point(1.0, 10.0, 0.0, 5.0), point(3.0, 10.0, 0.0, 9.0)];
        let matrix = FeatureMatrix::from_points(&points).unwrap();

        let means = matrix.column_means();
        assert_eq!(means[0], 2.0);
        assert_eq!(means[1], 10.0);
        assert_eq!(means[3], 7.0);

        let stds = matrix.column_stds();
        assert_eq!(stds[0], 1.0);
        assert_eq!(stds[1], 0.0); // constant column
        assert_eq!(stds[3], 2.0);
    }
}
