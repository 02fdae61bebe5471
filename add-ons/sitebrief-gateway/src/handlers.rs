//! Route handlers for the SiteBrief gateway.
//!
//! Validation and authorization are resolved here at the boundary; the core
//! services only ever see requests that already carry a resolved reviewer
//! identity where one is required.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use crate::AppState;
use sitebrief_core::{CompletionRequest, CoreError, Identity, SubmitRequest};

/// GET /api/v1/health – liveness check.
pub(crate) async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.config.app_name,
        "message": "SiteBrief backend is live."
    }))
}

/// POST /api/ai – one completion round trip, chat or final mode.
///
/// The `type` tag is checked before anything else; unknown tags are rejected
/// without a provider call. Provider failures surface as a generic 500 so the
/// client can degrade to its fallback behavior.
pub(crate) async fn ai_complete(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mode = body.get("type").and_then(Value::as_str).unwrap_or_default();
    if mode != "chat" && mode != "final" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid request type." })),
        );
    }

    let request: CompletionRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Malformed request: {}", e) })),
            )
        }
    };

    match state.bridge.run(request).await {
        Ok(text) => (StatusCode::OK, Json(json!({ "text": text }))),
        Err(e) => {
            tracing::error!(target: "sitebrief::gateway", error = %e, "AI completion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error." })),
            )
        }
    }
}

/// POST /api/preferences – handoff submission.
pub(crate) async fn submit_preference(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> (StatusCode, Json<Value>) {
    match state.handoff.submit(request).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Preference submitted successfully",
                "preference": record,
            })),
        ),
        Err(e) => error_response(e),
    }
}

/// GET /api/admin/users – every identity with its submission status.
/// Reviewer-only.
pub(crate) async fn admin_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers).await {
        return rejection;
    }
    match state.directory.list_users_with_status() {
        Ok(rows) => (StatusCode::OK, Json(json!(rows))),
        Err(e) => error_response(e),
    }
}

/// GET /api/admin/preference/:id – one record with its submitter populated.
/// Reviewer-only.
pub(crate) async fn admin_preference(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers).await {
        return rejection;
    }
    match state.directory.get_record(&id) {
        Ok(detail) => (StatusCode::OK, Json(json!(detail))),
        Err(e) => error_response(e),
    }
}

/// Resolves the bearer credential before any data access. Missing or
/// malformed headers never reach the identity provider.
async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Identity, (StatusCode, Json<Value>)> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim);
    let Some(token) = token else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Not authorized: token missing or malformed" })),
        ));
    };
    state
        .identities
        .resolve_bearer(token)
        .await
        .map_err(|e| (StatusCode::UNAUTHORIZED, Json(json!({ "message": e.to_string() }))))
}

fn error_response(err: CoreError) -> (StatusCode, Json<Value>) {
    let status = match &err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Upstream(_) => StatusCode::BAD_GATEWAY,
        CoreError::Storage(_) | CoreError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match &err {
        // storage details stay in the logs
        CoreError::Storage(_) | CoreError::Codec(_) => {
            tracing::error!(target: "sitebrief::gateway", error = %err, "store failure");
            "Server error".to_string()
        }
        other => other.to_string(),
    };
    (status, Json(json!({ "message": message })))
}
