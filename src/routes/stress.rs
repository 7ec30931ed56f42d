//! Synthetic CPU stress endpoint for autoscaling and health check tests.
//!
//! The requested duration is clamped to the hard ceiling, the busy loop runs on
//! the blocking pool, and a fresh snapshot is taken afterward so the caller can
//! see the pressure it produced.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::load::clamp_seconds;
use crate::metrics::{collect_logged, InstanceInfo};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StressResponse {
    pub message: String,
    pub requested_duration: u64,
    pub actual_duration: f64,
    pub instance_info: InstanceInfo,
}

/// Parse the `{seconds}` segment. Only non-negative integers match the route.
pub fn parse_seconds(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Digit strings too large for u64 are still valid requests; they clamp anyway
    Some(raw.parse().unwrap_or(u64::MAX))
}

#[instrument(name = "stress::stress", skip(state))]
pub async fn stress(
    State(state): State<AppState>,
    Path(raw_seconds): Path<String>,
) -> Result<Json<StressResponse>, AppError> {
    let requested = parse_seconds(&raw_seconds).ok_or(AppError::NotFound)?;
    let effective = clamp_seconds(requested);

    tracing::info!(requested, effective, "Starting stress test");

    let load = state.load.clone();
    let elapsed = tokio::task::spawn_blocking(move || load.run(effective))
        .await
        .map_err(|e| AppError::Internal(format!("stress task failed: {}", e)))?;
    let actual_duration = elapsed.as_secs_f64();

    tracing::info!(actual_duration, "Stress test completed");

    let instance_info = InstanceInfo::from(collect_logged(state.metrics.as_ref()).await);

    Ok(Json(StressResponse {
        message: format!("Stress test completed in {:.2} seconds", actual_duration),
        requested_duration: requested,
        actual_duration,
        instance_info,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds_accepts_digits() {
        assert_eq!(parse_seconds("0"), Some(0));
        assert_eq!(parse_seconds("1"), Some(1));
        assert_eq!(parse_seconds("1000"), Some(1000));
    }

    #[test]
    fn test_parse_seconds_rejects_non_integers() {
        assert_eq!(parse_seconds(""), None);
        assert_eq!(parse_seconds("-1"), None);
        assert_eq!(parse_seconds("+1"), None);
        assert_eq!(parse_seconds("1.5"), None);
        assert_eq!(parse_seconds("abc"), None);
    }

    #[test]
    fn test_parse_seconds_saturates_huge_values() {
        assert_eq!(parse_seconds("99999999999999999999999"), Some(u64::MAX));
    }
}
