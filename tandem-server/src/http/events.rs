//! Event submission and history import endpoints

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tandem_core::{
    Domain, EventType, FullState, RuntimeRecord, ScoreEvent, ScoringResult, Severity, Side,
    SubmitOptions,
};
use uuid::Uuid;

use super::{error_json, store_error_response};
use crate::AppState;

const MIN_BONUS: f64 = 1.0;
const MAX_BONUS: f64 = 10.0;

/// Wire form of a reported event. camelCase aliases match the original
/// hub's clients.
#[derive(Debug, Deserialize)]
pub struct EventBody {
    pub side: Side,
    #[serde(alias = "eventType")]
    pub event_type: EventType,
    pub domain: Domain,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default, alias = "patternCode")]
    pub pattern_code: Option<String>,
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default, alias = "clusterRef")]
    pub cluster_ref: Option<Uuid>,
    #[serde(default, alias = "bonusAmount")]
    pub bonus_amount: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EventBody {
    /// Missing client timestamps fall back to the server receive time.
    fn into_score_event(self, now: DateTime<Utc>) -> ScoreEvent {
        ScoreEvent {
            side: self.side,
            event_type: self.event_type,
            domain: self.domain,
            severity: self.severity,
            pattern_code: self.pattern_code,
            session_id: self.session_id,
            cluster_ref: self.cluster_ref,
            bonus_amount: self.bonus_amount,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

/// An event backfilled from another hub or a local log.
#[derive(Debug, Deserialize)]
pub struct ImportBody {
    /// Idempotency key from the source system.
    #[serde(alias = "externalId")]
    pub external_id: String,
    #[serde(flatten)]
    pub event: EventBody,
}

/// What an accepted event did to the scores.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub event_id: String,
    pub accepted: bool,
    pub scoring: ScoringResult,
    pub state: FullState,
}

fn validate(body: &EventBody) -> Option<Response> {
    if body.event_type == EventType::Error && body.severity.is_none() {
        return Some(error_json(
            StatusCode::UNPROCESSABLE_ENTITY,
            "MISSING_SEVERITY",
            "Error events require a severity",
        ));
    }
    if let Some(amount) = body.bonus_amount {
        if !(MIN_BONUS..=MAX_BONUS).contains(&amount) {
            return Some(error_json(
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                format!("bonus_amount must be between {MIN_BONUS} and {MAX_BONUS}"),
            ));
        }
    }
    None
}

fn submit(
    state: &AppState,
    runtime: &RuntimeRecord,
    body: EventBody,
    opts_for: impl FnOnce(DateTime<Utc>) -> SubmitOptions,
) -> Response {
    if let Some(rejection) = validate(&body) {
        return rejection;
    }
    let now = Utc::now();
    let opts = opts_for(now);
    let event = body.into_score_event(now);
    match state.store.submit_event(&runtime.id, &event, &opts) {
        Ok(outcome) => {
            tracing::debug!(
                "Scored {} {} for {}: delta {:+.1}",
                event.side,
                event.event_type,
                runtime.id,
                outcome.scoring.delta
            );
            Json(EventResponse {
                event_id: outcome.event_id,
                accepted: true,
                scoring: outcome.scoring,
                state: outcome.state,
            })
            .into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// POST /api/events
pub async fn submit_event(
    State(state): State<Arc<AppState>>,
    Extension(runtime): Extension<RuntimeRecord>,
    Json(body): Json<EventBody>,
) -> impl IntoResponse {
    let limits = state.rate_limits;
    submit(&state, &runtime, body, |now| SubmitOptions::live(now, limits))
}

/// POST /api/import/event
pub async fn import_event(
    State(state): State<Arc<AppState>>,
    Extension(runtime): Extension<RuntimeRecord>,
    Json(body): Json<ImportBody>,
) -> impl IntoResponse {
    if body.external_id.is_empty() {
        return error_json(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            "external_id must not be empty",
        );
    }
    let external_id = body.external_id;
    submit(&state, &runtime, body.event, |now| {
        SubmitOptions::import(now, external_id)
    })
}
