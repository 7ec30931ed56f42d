//! Deliberate failure endpoint for exercising alerting pipelines.

use crate::error::AppError;

/// Always answers 500 with the test error payload.
pub async fn error() -> AppError {
    tracing::error!("Test error endpoint called");
    AppError::Simulated
}
