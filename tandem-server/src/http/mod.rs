//! HTTP server module

mod api;
mod events;
mod register;
mod runtime;

use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tandem_core::StoreError;
use tower_http::cors::CorsLayer;

use crate::AppState;

pub use api::{HealthResponse, LeaderboardParams};
pub use events::{EventBody, EventResponse, ImportBody};
pub use register::{RegisterRequest, RegisterResponse};
pub use runtime::{RuntimeProfile, StateResponse};

/// Error body shared by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Only present on interval rate-limit rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<i64>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            retry_after_ms: None,
        }
    }
}

pub(crate) fn error_json(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

/// Map storage failures onto the API's status codes and error codes.
pub(crate) fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::RuntimeNotFound(id) => error_json(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Runtime not found: {id}"),
        ),
        StoreError::DuplicateRuntime => error_json(
            StatusCode::CONFLICT,
            "ALREADY_REGISTERED",
            "A runtime with this platform/model/thinking/alias is already registered",
        ),
        StoreError::DuplicateEvent(id) => error_json(
            StatusCode::CONFLICT,
            "DUPLICATE_EVENT",
            format!("Event already imported: {id}"),
        ),
        StoreError::RateLimited {
            min_interval_secs,
            retry_after_ms,
        } => {
            let mut body = ErrorResponse::new(
                "RATE_LIMITED",
                format!("Rate limit exceeded. Max 1 event per {min_interval_secs}s."),
            );
            body.retry_after_ms = Some(retry_after_ms);
            (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
        }
        StoreError::DailyLimitExceeded { max_events_per_day } => error_json(
            StatusCode::TOO_MANY_REQUESTS,
            "DAILY_LIMIT",
            format!("Daily limit exceeded. Max {max_events_per_day} events/day."),
        ),
        other => error_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            other.to_string(),
        ),
    }
}

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let authed = Router::new()
        .route("/api/events", post(events::submit_event))
        .route("/api/import/event", post(events::import_event))
        .route("/api/runtime/:id/state", get(runtime::get_state))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::api_auth,
        ));

    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/register", post(register::register_runtime))
        .route("/api/runtime/:id", get(runtime::get_runtime))
        .route("/api/leaderboard", get(api::leaderboard))
        .route("/api/stats", get(api::stats))
        .merge(authed)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
