//! Webhook routes
//!
//! Signature verification happens against the raw body before anything is
//! parsed. An unconfigured secret refuses every delivery: this endpoint
//! fails closed, never open.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::state::AppState;
use github::{verify_signature, WebhookPayload};

#[derive(Serialize)]
pub struct WebhookResponse {
    ok: bool,
    accepted: usize,
    duplicates: usize,
    skipped: usize,
}

pub async fn github(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, StatusCode> {
    let Some(secret) = &state.config.github_webhook_secret else {
        error!("GITHUB_WEBHOOK_SECRET is not configured; refusing delivery");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let event_type = headers
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing X-GitHub-Event header");
            StatusCode::BAD_REQUEST
        })?;

    let signature = headers
        .get("X-Hub-Signature-256")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing X-Hub-Signature-256 header");
            StatusCode::UNAUTHORIZED
        })?;

    if !verify_signature(signature, secret, &body) {
        warn!("Invalid webhook signature");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let payload = WebhookPayload::parse(event_type, &body).map_err(|e| {
        error!("Failed to parse webhook: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let summary = state.ingestor.handle_webhook(payload).await.map_err(|e| {
        error!("Failed to handle webhook: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    info!(
        "Processed {} event: {} accepted, {} duplicates, {} skipped",
        event_type, summary.accepted, summary.duplicates, summary.skipped
    );

    Ok(Json(WebhookResponse {
        ok: true,
        accepted: summary.accepted,
        duplicates: summary.duplicates,
        skipped: summary.skipped,
    }))
}
