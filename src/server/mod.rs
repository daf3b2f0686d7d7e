//! Inbound trigger surface: webhook, manual reindex, bootstrap, health.
//!
//! Each request runs one reconciliation to completion before responding;
//! there is no internal queue. When a trigger token is configured every
//! mutating endpoint requires `Authorization: Bearer <token>` and rejects
//! before any reconciliation work begins. Without a configured token the
//! endpoints are open; acceptable for development, not recommended for
//! production.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::ingest::Processor;
use crate::store::MetadataStore;

/// Header carrying the provider's change-feed resumption cursor on
/// webhook deliveries.
pub const PAGE_TOKEN_HEADER: &str = "x-grovesync-page-token";

/// Shared state behind the router.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<Processor>,
    pub store: Arc<dyn MetadataStore>,
    pub trigger_token: Option<String>,
    pub has_embeddings: bool,
}

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/drive/webhook", post(webhook))
        .route("/reindex/{node_id}", post(reindex))
        .route("/bootstrap", post(bootstrap))
        .with_state(state)
}

fn authorized(expected: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(token) = expected else {
        return true;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {token}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
    )
        .into_response()
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "has_embeddings": state.has_embeddings }))
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    changes: Vec<ChangeEntry>,
}

#[derive(Debug, Deserialize)]
struct ChangeEntry {
    #[serde(rename = "fileId")]
    file_id: Option<String>,
    id: Option<String>,
}

impl ChangeEntry {
    fn node_id(&self) -> Option<&str> {
        self.file_id.as_deref().or(self.id.as_deref())
    }
}

async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> Response {
    if !authorized(state.trigger_token.as_deref(), &headers) {
        return unauthorized();
    }

    let node_ids: Vec<String> = payload
        .changes
        .iter()
        .filter_map(|entry| entry.node_id().map(str::to_string))
        .collect();
    info!(changes = node_ids.len(), "webhook delivery received");

    let report = state.processor.handle_changes(&node_ids).await;

    if let Some(token) = headers.get(PAGE_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        // The cursor is a convenience for the next poll; a failed write
        // must not turn an otherwise processed delivery into a retry.
        if let Err(err) = state.store.record_page_token(token).await {
            warn!(error = %err, "failed to record change-feed cursor");
        }
    }

    Json(json!({
        "processed": report.processed,
        "failed": report.failed,
    }))
    .into_response()
}

async fn reindex(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(state.trigger_token.as_deref(), &headers) {
        return unauthorized();
    }

    match state.processor.handle_change(&node_id).await {
        Ok(()) => Json(json!({ "status": "completed", "node_id": node_id })).into_response(),
        Err(err) => internal_error(err),
    }
}

async fn bootstrap(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authorized(state.trigger_token.as_deref(), &headers) {
        return unauthorized();
    }

    match state.processor.bootstrap().await {
        Ok(()) => Json(json!({ "status": "completed" })).into_response(),
        Err(err) => internal_error(err),
    }
}
