//! Linked repository routes
//!
//! Linking a repo is what puts it on the poller's rotation. The GitHub id
//! is resolved through the API so the unique key survives renames.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiResult, DbResultExt};
use crate::state::AppState;
use common::models::Repository;

#[derive(Debug, Deserialize)]
pub struct LinkRepoRequest {
    pub owner: String,
    pub name: String,
}

/// Link a repository for poll-based sync
pub async fn link(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LinkRepoRequest>,
) -> ApiResult<(StatusCode, Json<Repository>)> {
    let detail = state.github.get_repo(&req.owner, &req.name).await?;

    let repo = db::repos::upsert(&state.pool, detail.id, &req.owner, &req.name)
        .await
        .db_err()?;

    Ok((StatusCode::CREATED, Json(repo)))
}

/// List linked repositories
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Repository>>> {
    let repos = db::repos::list(&state.pool).await.db_err()?;
    Ok(Json(repos))
}
