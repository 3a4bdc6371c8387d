//! Error types for the metricsense crate

use thiserror::Error;

/// Result type alias for metricsense operations
pub type Result<T> = std::result::Result<T, MetricsenseError>;

/// Main error type for the detection pipeline
#[derive(Error, Debug)]
pub enum MetricsenseError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    Range {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Empty batch: at least one metric point is required")]
    EmptyBatch,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<csv::Error> for MetricsenseError {
    fn from(err: csv::Error) -> Self {
        MetricsenseError::Csv(err.to_string())
    }
}

impl From<rusqlite::Error> for MetricsenseError {
    fn from(err: rusqlite::Error) -> Self {
        MetricsenseError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MetricsenseError::Schema("missing column 'cpu'".to_string());
        assert_eq!(err.to_string(), "Schema error: missing column 'cpu'");
    }

    #[test]
    fn test_range_error_display() {
        let err = MetricsenseError::Range {
            name: "contamination".to_string(),
            value: "0.5".to_string(),
            reason: "must be within [0.01, 0.30]".to_string(),
        };
        assert!(err.to_string().contains("contamination"));
        assert!(err.to_string().contains("0.5"));
    }
}
