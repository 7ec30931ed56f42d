//! Health check endpoint for load balancer target checks.
//!
//! Returns 200 when every checked metric is below the threshold and 500
//! otherwise, so an unhealthy instance is drained by the balancer. A failed
//! collection also answers 500, with an error payload instead of readings.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::health::{evaluate, HealthChecks, HealthStatus};
use crate::metrics::collect_logged;
use crate::state::AppState;

use super::timestamp;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: String,
    pub checks: HealthChecks,
}

/// Health check handler.
#[instrument(name = "health::health", skip(state))]
pub async fn health(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>), AppError> {
    let snapshot = collect_logged(state.metrics.as_ref()).await?;
    let verdict = evaluate(&snapshot, state.health_policy());

    if !verdict.is_healthy() {
        tracing::warn!(
            cpu = verdict.checks.cpu,
            memory = verdict.checks.memory,
            disk = ?verdict.checks.disk,
            "Instance unhealthy"
        );
    }

    Ok((
        verdict.status_code(),
        Json(HealthResponse {
            status: verdict.status,
            timestamp: timestamp(),
            checks: verdict.checks,
        }),
    ))
}
