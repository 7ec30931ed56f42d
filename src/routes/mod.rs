//! HTTP route handlers.
//!
//! Every response carries the fixed `Server`, `X-Content-Type-Options` and
//! `X-Frame-Options` headers, including 404 and panic responses.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod home;
pub mod simulated;
pub mod stress;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderName, HeaderValue, SERVER, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::SERVER_HEADER;
use crate::error::{handle_panic, AppError};
use crate::middleware::request_id_layer;
use crate::state::AppState;

fn fixed_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

/// Current local time in ISO 8601 form, as used in response bodies.
pub fn timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Fallback for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Creates the Axum router with all routes and response headers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/health", get(health::health))
        .route("/stress/{seconds}", get(stress::stress))
        .route("/error", get(simulated::error))
        .fallback(not_found)
        .with_state(state)
        // Panics become the generic 500 payload; headers are added on top
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(fixed_header(SERVER, SERVER_HEADER))
        .layer(fixed_header(X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(fixed_header(X_FRAME_OPTIONS, "SAMEORIGIN"))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_rfc3339_with_offset() {
        let stamp = timestamp();
        let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).unwrap();
        let age = chrono::Utc::now().signed_duration_since(parsed);
        assert!(age.num_seconds().abs() < 5);
    }
}
