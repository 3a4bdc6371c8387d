//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::MetricPoint;
use crate::detector::{detect, AnomalyRecord};
use crate::storage::RunSummary;

use super::error::{Result, ServerError};
use super::state::AppState;

fn default_contamination() -> f64 {
    0.05
}

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub points: Vec<MetricPoint>,
    #[serde(default = "default_contamination")]
    pub contamination: f64,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub total_points: usize,
    pub anomalies_found: usize,
    pub anomalies: Vec<AnomalyRecord>,
    /// Assigned run id, absent when the run could not be recorded
    pub run_id: Option<i64>,
    pub persisted: bool,
}

/// Score a batch, flag anomalies, and record the run.
///
/// A storage failure degrades the response (`persisted: false`) but never
/// discards an already-computed detection result.
pub async fn detect_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DetectRequest>,
) -> Result<Json<DetectResponse>> {
    let config = state.detector.with_contamination(request.contamination);
    let detection = detect(&request.points, &config)?;

    info!(
        total_points = detection.total_points,
        anomalies_found = detection.anomalies.len(),
        contamination = request.contamination,
        "Detection complete"
    );

    let run_id = match state
        .db
        .record_run(detection.total_points, &detection.anomalies)
    {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(detail = %e, "Failed to record run, returning unrecorded result");
            None
        }
    };

    Ok(Json(DetectResponse {
        total_points: detection.total_points,
        anomalies_found: detection.anomalies.len(),
        anomalies: detection.anomalies,
        persisted: run_id.is_some(),
        run_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    pub limit: Option<usize>,
}

/// The N most recent run summaries, newest first
pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunsQuery>,
) -> Result<Json<Vec<RunSummary>>> {
    let limit = query.limit.unwrap_or(25);
    let runs = state.db.list_runs(limit)?;
    Ok(Json(runs))
}

/// All anomaly records for a run, score descending
pub async fn run_anomalies(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<i64>,
) -> Result<Json<Vec<AnomalyRecord>>> {
    if !state.db.run_exists(run_id)? {
        return Err(ServerError::NotFound(format!("no run with id {run_id}")));
    }
    let records = state.db.anomalies_for_run(run_id)?;
    Ok(Json(records))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "metricsense",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
