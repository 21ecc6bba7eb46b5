//! API key authentication middleware for axum

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tandem_core::apikey::hash_api_key;

use crate::http::ErrorResponse;
use crate::state::AppState;

/// Extract the runtime key from `Authorization: Bearer tandem_live_...`
fn extract_bearer(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Authentication middleware function
///
/// Resolves the presented key digest to a runtime record and attaches the
/// record to the request extensions. Quarantined runtimes are rejected
/// before any handler runs.
pub async fn api_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let Some(token) = extract_bearer(&request) else {
        tracing::debug!("Request without bearer token");
        return Err(unauthorized("Missing bearer token"));
    };

    let record = state
        .store
        .runtime_by_key_hash(&hash_api_key(token))
        .map_err(|e| {
            tracing::error!("Auth lookup failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("INTERNAL_ERROR", e.to_string())),
            )
        })?;

    let Some(record) = record else {
        tracing::debug!("Unknown API key");
        return Err(unauthorized("Unknown API key"));
    };

    if record.quarantine {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "QUARANTINED",
                "This runtime is quarantined",
            )),
        ));
    }

    request.extensions_mut().insert(record);
    Ok(next.run(request).await)
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("UNAUTHORIZED", message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request {
        Request::builder()
            .header("authorization", value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_bearer() {
        let request = request_with_auth("Bearer tandem_live_abc");
        assert_eq!(extract_bearer(&request), Some("tandem_live_abc"));
    }

    #[test]
    fn test_extract_bearer_missing_header() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_bearer(&request), None);
    }

    #[test]
    fn test_extract_bearer_wrong_scheme() {
        let request = request_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer(&request), None);
    }
}
