//! Cron-triggered routes
//!
//! Guarded by a bearer-token shared secret, not user auth: these are for
//! the scheduler, and redelivery is safe because every write they cause
//! is idempotent. An unconfigured secret means 401 for everyone.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use processor::{run_weekly_reset, ResetSummary, SyncConfig, SyncService, SyncSummary};

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(secret) = &state.config.cron_secret else {
        warn!("CRON_SECRET is not configured; refusing cron request");
        return Err(ApiError::Unauthorized);
    };

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if header != Some(format!("Bearer {}", secret).as_str()) {
        warn!("Cron request with missing or wrong credential");
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}

/// Close the current period: rank, award trophies, snapshot, reset
pub async fn weekly_reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ResetSummary>> {
    authorize(&state, &headers)?;

    let summary = run_weekly_reset(&state.pool, state.clock.as_ref())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(summary))
}

/// Poll all linked repos once, outside the background interval
pub async fn sync(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<SyncSummary>> {
    authorize(&state, &headers)?;

    let service = SyncService::new(state.ingestor.clone(), SyncConfig::default());
    let summary = service
        .sync_all()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(summary))
}
