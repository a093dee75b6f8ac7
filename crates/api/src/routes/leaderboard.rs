//! Leaderboard routes
//!
//! All three boards run through the same ranking query; only the member
//! scope differs.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiResult, DbResultExt, OptionExt};
use crate::state::AppState;
use common::models::LeaderboardEntry;
use db::leaderboard::Scope;

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    limit: i32,
}

fn default_limit() -> i32 {
    50
}

/// Global leaderboard over current period scores
pub async fn global(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let entries = db::leaderboard::get_leaderboard(&state.pool, Scope::Global, query.limit)
        .await
        .db_err()?;

    Ok(Json(entries))
}

/// A user's friends board: their mutual follows plus themselves
pub async fn friends(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let user = db::users::get_by_login(&state.pool, &login)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", login))?;

    let entries =
        db::leaderboard::get_leaderboard(&state.pool, Scope::Friends(user.id), query.limit)
            .await
            .db_err()?;

    Ok(Json(entries))
}

/// A group's member board
pub async fn group(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    db::groups::get_group(&state.pool, group_id)
        .await
        .db_err()?
        .not_found(format!("Group '{}' not found", group_id))?;

    let entries =
        db::leaderboard::get_leaderboard(&state.pool, Scope::Group(group_id), query.limit)
            .await
            .db_err()?;

    Ok(Json(entries))
}
