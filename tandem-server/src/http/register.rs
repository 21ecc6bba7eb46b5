//! Runtime registration endpoint

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tandem_core::NewRuntime;
use tandem_core::apikey::{generate_api_key, hash_api_key};

use super::{error_json, store_error_response};
use crate::AppState;

const MAX_PLATFORM_LEN: usize = 100;
const MAX_MODEL_LEN: usize = 100;
const MAX_THINKING_LEN: usize = 20;
const MAX_DISPLAY_NAME_LEN: usize = 200;
const MAX_OWNER_ALIAS_LEN: usize = 100;

/// Registration request body
///
/// Clients written against the original hub send camelCase field names, so
/// those are accepted as aliases.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub platform: String,
    pub model: String,
    pub thinking: String,
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(default, alias = "ownerAlias")]
    pub owner_alias: Option<String>,
}

/// Registration response; the API key appears here and nowhere else.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub runtime_id: String,
    pub api_key: String,
    pub runtime: String,
    pub message: String,
}

fn validate(req: &RegisterRequest) -> Option<String> {
    if req.platform.is_empty() || req.platform.len() > MAX_PLATFORM_LEN {
        return Some(format!("platform must be 1-{MAX_PLATFORM_LEN} characters"));
    }
    if req.model.is_empty() || req.model.len() > MAX_MODEL_LEN {
        return Some(format!("model must be 1-{MAX_MODEL_LEN} characters"));
    }
    if req.thinking.is_empty() || req.thinking.len() > MAX_THINKING_LEN {
        return Some(format!("thinking must be 1-{MAX_THINKING_LEN} characters"));
    }
    if let Some(ref name) = req.display_name {
        if name.len() > MAX_DISPLAY_NAME_LEN {
            return Some(format!(
                "display_name must be at most {MAX_DISPLAY_NAME_LEN} characters"
            ));
        }
    }
    if let Some(ref alias) = req.owner_alias {
        if alias.len() > MAX_OWNER_ALIAS_LEN {
            return Some(format!(
                "owner_alias must be at most {MAX_OWNER_ALIAS_LEN} characters"
            ));
        }
    }
    None
}

/// POST /api/register
pub async fn register_runtime(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    if let Some(message) = validate(&req) {
        return error_json(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message);
    }

    let api_key = generate_api_key();
    let new = NewRuntime {
        platform: req.platform,
        model: req.model,
        thinking: req.thinking,
        display_name: req.display_name,
        owner_alias: req.owner_alias,
        api_key_hash: hash_api_key(&api_key),
    };

    match state.store.register_runtime(&new) {
        Ok(record) => {
            tracing::info!("Registered runtime {} ({})", record.id, record.label());
            (
                StatusCode::CREATED,
                Json(RegisterResponse {
                    runtime: record.label(),
                    runtime_id: record.id,
                    api_key,
                    message: "Store this API key now; it is shown only once.".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => store_error_response(e),
    }
}
