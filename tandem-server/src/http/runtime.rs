//! Runtime profile and scoring-state endpoints

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tandem_core::{EventStamp, FullState, MaturityTier, RuntimeRecord};

use super::{error_json, store_error_response};
use crate::AppState;

/// Public view of a registered runtime: identity plus headline scores.
/// Key material and the detailed state projection stay out of it.
#[derive(Debug, Serialize, Deserialize)]
pub struct RuntimeProfile {
    pub id: String,
    pub runtime: String,
    pub platform: String,
    pub model: String,
    pub thinking: String,
    pub display_name: Option<String>,
    pub owner_alias: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
    pub agent_score: f64,
    pub user_score: f64,
    pub team_score: f64,
    pub eval_count: u64,
    pub maturity_tier: MaturityTier,
}

impl From<RuntimeRecord> for RuntimeProfile {
    fn from(record: RuntimeRecord) -> Self {
        Self {
            runtime: record.label(),
            id: record.id,
            platform: record.platform,
            model: record.model,
            thinking: record.thinking,
            display_name: record.display_name,
            owner_alias: record.owner_alias,
            registered_at: record.registered_at,
            is_active: record.is_active,
            agent_score: record.state.agent_score,
            user_score: record.state.user_score,
            team_score: record.state.team_score,
            eval_count: record.state.eval_count,
            maturity_tier: record.state.maturity_tier,
        }
    }
}

/// Full scoring state, key-holder only.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub runtime_id: String,
    pub runtime: String,
    pub state: FullState,
    pub last_event: Option<EventStamp>,
}

/// GET /api/runtime/:id
pub async fn get_runtime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.runtime(&id) {
        Ok(Some(record)) => Json(RuntimeProfile::from(record)).into_response(),
        Ok(None) => error_json(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Runtime not found: {id}"),
        ),
        Err(e) => store_error_response(e),
    }
}

/// GET /api/runtime/:id/state
///
/// The authenticated key must belong to the runtime named in the path.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Extension(runtime): Extension<RuntimeRecord>,
) -> impl IntoResponse {
    if runtime.id != id {
        return error_json(
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "API key does not match this runtime",
        );
    }

    match state.store.last_event(&runtime.id) {
        Ok(last_event) => Json(StateResponse {
            runtime: runtime.label(),
            state: runtime.state.full_state(),
            runtime_id: runtime.id,
            last_event,
        })
        .into_response(),
        Err(e) => store_error_response(e),
    }
}
