//! Root route: instance identity and request counter.
//!
//! Used to watch a load balancer spread traffic across instances.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use crate::config::WELCOME_MESSAGE;
use crate::metrics::{collect_logged, InstanceInfo};
use crate::state::AppState;

use super::timestamp;

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub message: &'static str,
    pub instance_info: InstanceInfo,
    pub request_count: u64,
    pub timestamp: String,
}

/// Counts the request and reports a fresh snapshot.
///
/// A failed collection is reported inside `instance_info` rather than failing
/// the request; the counter has already been advanced at that point.
#[instrument(name = "home::index", skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<HomeResponse> {
    let request_count = state.requests.increment_and_get();
    let instance_info = InstanceInfo::from(collect_logged(state.metrics.as_ref()).await);

    tracing::info!(
        request_count,
        hostname = instance_info.hostname().unwrap_or("unknown"),
        "Request processed on instance"
    );

    Json(HomeResponse {
        message: WELCOME_MESSAGE,
        instance_info,
        request_count,
        timestamp: timestamp(),
    })
}
