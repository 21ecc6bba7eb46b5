//! End-to-end tests for the hub HTTP API

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use tandem_core::LeaderboardPage;
use tandem_server::http::{
    ErrorResponse, EventResponse, RegisterResponse, RuntimeProfile, StateResponse,
};
use tandem_server::{AppState, create_router};

fn spawn_hub() -> (TestServer, Arc<AppState>) {
    let state = Arc::new(AppState::in_memory().unwrap());
    let server = TestServer::new(create_router(state.clone())).unwrap();
    (server, state)
}

async fn register(server: &TestServer, platform: &str, alias: &str) -> RegisterResponse {
    let response = server
        .post("/api/register")
        .json(&json!({
            "platform": platform,
            "model": "anthropic/claude-opus",
            "thinking": "high",
            "owner_alias": alias
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn import_correct(server: &TestServer, key: &str, external_id: &str) -> EventResponse {
    let response = server
        .post("/api/import/event")
        .authorization_bearer(key)
        .json(&json!({
            "externalId": external_id,
            "side": "agent",
            "event_type": "correct",
            "domain": "TECH"
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn registration_issues_a_key_once() {
    let (server, _state) = spawn_hub();

    let created = register(&server, "claude-code", "ana").await;
    assert!(created.api_key.starts_with("tandem_live_"));
    assert_eq!(created.runtime, "claude-code/claude-opus/high");

    let profile: RuntimeProfile = server
        .get(&format!("/api/runtime/{}", created.runtime_id))
        .await
        .json();
    assert_eq!(profile.id, created.runtime_id);
    assert_eq!(profile.team_score, 50.0);
    assert_eq!(profile.eval_count, 0);
    assert_eq!(profile.owner_alias.as_deref(), Some("ana"));

    let duplicate = server
        .post("/api/register")
        .json(&json!({
            "platform": "claude-code",
            "model": "anthropic/claude-opus",
            "thinking": "high",
            "owner_alias": "ana"
        }))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);
    let body: ErrorResponse = duplicate.json();
    assert_eq!(body.code, "ALREADY_REGISTERED");
}

#[tokio::test]
async fn unknown_runtime_profile_is_404() {
    let (server, _state) = spawn_hub();

    let response = server.get("/api/runtime/no-such-runtime").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: ErrorResponse = response.json();
    assert_eq!(body.code, "NOT_FOUND");
}

#[tokio::test]
async fn submission_requires_a_known_key() {
    let (server, state) = spawn_hub();
    let created = register(&server, "claude-code", "ana").await;
    let event = json!({"side": "agent", "event_type": "correct", "domain": "TECH"});

    let anonymous = server.post("/api/events").json(&event).await;
    anonymous.assert_status_unauthorized();

    let bogus = server
        .post("/api/events")
        .authorization_bearer("tandem_live_feedfacecafe")
        .json(&event)
        .await;
    bogus.assert_status_unauthorized();

    state.store.set_quarantine(&created.runtime_id, true).unwrap();
    let quarantined = server
        .post("/api/events")
        .authorization_bearer(&created.api_key)
        .json(&event)
        .await;
    quarantined.assert_status(StatusCode::FORBIDDEN);
    let body: ErrorResponse = quarantined.json();
    assert_eq!(body.code, "QUARANTINED");
}

#[tokio::test]
async fn events_score_and_return_state() {
    let (server, _state) = spawn_hub();
    let created = register(&server, "claude-code", "ana").await;

    let response = server
        .post("/api/events")
        .authorization_bearer(&created.api_key)
        .json(&json!({
            "side": "agent",
            "eventType": "error",
            "domain": "OPS",
            "severity": "medio",
            "patternCode": "stale-deploy",
            "sessionId": "sess-1"
        }))
        .await;
    response.assert_status_ok();

    let body: EventResponse = response.json();
    assert!(body.accepted);
    assert_eq!(body.scoring.delta, -3.0);
    assert_eq!(body.scoring.domain_score_after, 47.0);
    assert_eq!(body.scoring.global_score_after, 49.4);
    assert_eq!(body.scoring.eval_count, 1);
    assert!(!body.scoring.was_reincidence);

    assert_eq!(body.state.agent.global, 49.4);
    assert_eq!(body.state.user.global, 50.0);
    assert_eq!(body.state.team, 50.0);
    assert!(body.state.warmup.active);
    assert_eq!(body.state.warmup.remaining, 39);
}

#[tokio::test]
async fn error_events_need_a_severity() {
    let (server, _state) = spawn_hub();
    let created = register(&server, "claude-code", "ana").await;

    let response = server
        .post("/api/events")
        .authorization_bearer(&created.api_key)
        .json(&json!({"side": "agent", "event_type": "error", "domain": "TECH"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = response.json();
    assert_eq!(body.code, "MISSING_SEVERITY");

    let oversized_bonus = server
        .post("/api/events")
        .authorization_bearer(&created.api_key)
        .json(&json!({
            "side": "user",
            "event_type": "bonus",
            "domain": "COMMS",
            "bonus_amount": 11.0
        }))
        .await;
    oversized_bonus.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = oversized_bonus.json();
    assert_eq!(body.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn live_submissions_are_interval_limited() {
    let (server, _state) = spawn_hub();
    let created = register(&server, "claude-code", "ana").await;
    let event = json!({"side": "agent", "event_type": "correct", "domain": "TECH"});

    let first = server
        .post("/api/events")
        .authorization_bearer(&created.api_key)
        .json(&event)
        .await;
    first.assert_status_ok();

    let second = server
        .post("/api/events")
        .authorization_bearer(&created.api_key)
        .json(&event)
        .await;
    second.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: ErrorResponse = second.json();
    assert_eq!(body.code, "RATE_LIMITED");
    let retry_after = body.retry_after_ms.unwrap();
    assert!(retry_after > 0 && retry_after <= 60_000);
}

#[tokio::test]
async fn imports_dedup_and_skip_rate_limits() {
    let (server, _state) = spawn_hub();
    let created = register(&server, "claude-code", "ana").await;

    import_correct(&server, &created.api_key, "compi-1").await;

    // Back to back, which the live path would reject.
    import_correct(&server, &created.api_key, "compi-2").await;

    let replay = server
        .post("/api/import/event")
        .authorization_bearer(&created.api_key)
        .json(&json!({
            "externalId": "compi-1",
            "side": "agent",
            "event_type": "correct",
            "domain": "TECH"
        }))
        .await;
    replay.assert_status(StatusCode::CONFLICT);
    let body: ErrorResponse = replay.json();
    assert_eq!(body.code, "DUPLICATE_EVENT");

    let blank = server
        .post("/api/import/event")
        .authorization_bearer(&created.api_key)
        .json(&json!({
            "externalId": "",
            "side": "agent",
            "event_type": "correct",
            "domain": "TECH"
        }))
        .await;
    blank.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn state_endpoint_requires_the_matching_key() {
    let (server, _state) = spawn_hub();
    let ana = register(&server, "claude-code", "ana").await;
    let bea = register(&server, "cursor", "bea").await;

    let empty: StateResponse = server
        .get(&format!("/api/runtime/{}/state", ana.runtime_id))
        .authorization_bearer(&ana.api_key)
        .await
        .json();
    assert_eq!(empty.runtime_id, ana.runtime_id);
    assert!(empty.last_event.is_none());

    let submitted = import_correct(&server, &ana.api_key, "compi-9").await;
    let synced: StateResponse = server
        .get(&format!("/api/runtime/{}/state", ana.runtime_id))
        .authorization_bearer(&ana.api_key)
        .await
        .json();
    assert_eq!(
        synced.last_event.map(|e| e.id),
        Some(submitted.event_id)
    );
    assert_eq!(synced.state.maturity.eval_count, 1);

    let crossed = server
        .get(&format!("/api/runtime/{}/state", ana.runtime_id))
        .authorization_bearer(&bea.api_key)
        .await;
    crossed.assert_status(StatusCode::FORBIDDEN);
    let body: ErrorResponse = crossed.json();
    assert_eq!(body.code, "FORBIDDEN");
}

#[tokio::test]
async fn leaderboard_ranks_seasoned_runtimes() {
    let (server, _state) = spawn_hub();
    let ana = register(&server, "claude-code", "ana").await;
    let bea = register(&server, "cursor", "bea").await;

    for i in 0..10 {
        import_correct(&server, &ana.api_key, &format!("seed-a-{i}")).await;
    }
    for i in 0..3 {
        import_correct(&server, &bea.api_key, &format!("seed-b-{i}")).await;
    }

    let page: LeaderboardPage = server.get("/api/leaderboard").await.json();
    assert_eq!(page.total, 1);
    assert_eq!(page.entries.len(), 1);
    let top = &page.entries[0];
    assert_eq!(top.rank, 1);
    assert_eq!(top.id, ana.runtime_id);
    assert_eq!(top.eval_count, 10);
    // Ten clean evaluations compound into streak rewards on TECH.
    assert_eq!(top.agent_score, 52.4);
    assert_eq!(top.team_score, 51.2);

    let filtered: LeaderboardPage = server
        .get("/api/leaderboard")
        .add_query_param("platform", "cursor")
        .await
        .json();
    assert_eq!(filtered.total, 0);
    assert!(filtered.entries.is_empty());
}

#[tokio::test]
async fn stats_reflect_hub_activity() {
    let (server, _state) = spawn_hub();
    let ana = register(&server, "claude-code", "ana").await;
    let bea = register(&server, "cursor", "bea").await;

    import_correct(&server, &ana.api_key, "s-1").await;
    import_correct(&server, &ana.api_key, "s-2").await;
    import_correct(&server, &bea.api_key, "s-3").await;

    let stats: serde_json::Value = server.get("/api/stats").await.json();
    assert_eq!(stats["runtimes"]["total"], 2);
    assert_eq!(stats["runtimes"]["active"], 2);
    assert_eq!(stats["events"]["total"], 3);
    assert_eq!(stats["events"]["total_evals"], 3);
    let platforms = stats["platforms"].as_array().unwrap();
    assert_eq!(platforms.len(), 2);
}
