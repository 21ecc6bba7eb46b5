//! Public REST API handlers: health, leaderboard, hub stats

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tandem_core::store::DEFAULT_LEADERBOARD_LIMIT;
use tandem_core::{LeaderboardQuery, LeaderboardSort};

use super::store_error_response;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Query params for the leaderboard
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub sort: Option<String>,
    pub platform: Option<String>,
    pub model: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<LeaderboardParams> for LeaderboardQuery {
    fn from(p: LeaderboardParams) -> Self {
        Self {
            sort: p
                .sort
                .as_deref()
                .and_then(LeaderboardSort::parse)
                .unwrap_or_default(),
            platform: p.platform.filter(|s| !s.is_empty()),
            model: p.model.filter(|s| !s.is_empty()),
            limit: p.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT),
            offset: p.offset.unwrap_or(0),
        }
    }
}

/// GET /api/leaderboard
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardParams>,
) -> impl IntoResponse {
    match state.store.leaderboard(&params.into()) {
        Ok(page) => Json(page).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// GET /api/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => store_error_response(e),
    }
}
