use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::config::SIMULATED_ERROR_MESSAGE;
use crate::metrics::{CollectionError, COLLECTION_FAILED};
use crate::routes::timestamp;

/// Error payload for unmatched routes
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";

/// Error payload for unhandled faults
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Metrics collection failed: {0}")]
    Collection(#[from] CollectionError),

    #[error("Resource not found")]
    NotFound,

    #[error("Simulated error")]
    Simulated,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Collection(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": COLLECTION_FAILED,
                    "message": e.to_string(),
                    "timestamp": timestamp(),
                }),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": NOT_FOUND_MESSAGE })),
            AppError::Simulated => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": SIMULATED_ERROR_MESSAGE,
                    "timestamp": timestamp(),
                }),
            ),
            AppError::Internal(_) => {
                tracing::error!("Internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": INTERNAL_ERROR_MESSAGE }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Render a handler panic as the generic internal error payload.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(format!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_payload() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "Resource not found" }));
    }

    #[tokio::test]
    async fn test_collection_error_payload() {
        let err = CollectionError::Resolve {
            host: "web-1".to_string(),
            message: "Name or service not known".to_string(),
        };
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to collect metrics");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("Name or service not known"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = AppError::Internal("db password leaked".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_handle_panic_payload() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
    }
}
