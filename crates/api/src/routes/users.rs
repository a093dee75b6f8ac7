//! User routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiResult, DbResultExt, OptionExt};
use crate::state::AppState;
use common::models::{DailySummary, Group, PushEvent, Snapshot, StreakBonus, Trophy, User};
use common::Clock;

#[derive(Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    /// Today's activity, if any
    pub today: Option<DailySummary>,
}

/// Profile with points, streak and today's activity
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let user = db::users::get_by_login(&state.pool, &login)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", login))?;

    let today = db::daily::get(&state.pool, user.id, state.clock.today())
        .await
        .db_err()?;

    Ok(Json(UserProfile { user, today }))
}

/// All trophies a user has earned
pub async fn trophies(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
) -> ApiResult<Json<Vec<Trophy>>> {
    let user = db::users::get_by_login(&state.pool, &login)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", login))?;

    let trophies = db::trophies::list_for_user(&state.pool, user.id)
        .await
        .db_err()?;

    Ok(Json(trophies))
}

/// A user's streak bonus history (the audit log behind the totals)
pub async fn streak_bonuses(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
) -> ApiResult<Json<Vec<StreakBonus>>> {
    let user = db::users::get_by_login(&state.pool, &login)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", login))?;

    let bonuses = db::streaks::list_for_user(&state.pool, user.id, 100)
        .await
        .db_err()?;

    Ok(Json(bonuses))
}

/// A user's recent events, counted or not
pub async fn events(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
) -> ApiResult<Json<Vec<PushEvent>>> {
    let user = db::users::get_by_login(&state.pool, &login)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", login))?;

    let events = db::events::list_recent_for_user(&state.pool, user.id, 50)
        .await
        .db_err()?;

    Ok(Json(events))
}

/// Past period standings for a user, one snapshot per closed period
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
) -> ApiResult<Json<Vec<Snapshot>>> {
    let user = db::users::get_by_login(&state.pool, &login)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", login))?;

    let snapshots = db::snapshots::list_for_user(&state.pool, user.id)
        .await
        .db_err()?;

    Ok(Json(snapshots))
}

/// Groups the user belongs to
pub async fn groups(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
) -> ApiResult<Json<Vec<Group>>> {
    let user = db::users::get_by_login(&state.pool, &login)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", login))?;

    let groups = db::groups::list_for_user(&state.pool, user.id)
        .await
        .db_err()?;

    Ok(Json(groups))
}

#[derive(Serialize)]
pub struct FriendsSyncResponse {
    pub friends: usize,
}

/// Refresh a user's friend set from their mutual follows on GitHub.
/// Only mutual follows who are also users here become friends.
pub async fn sync_friends(
    State(state): State<Arc<AppState>>,
    Path(login): Path<String>,
) -> ApiResult<Json<FriendsSyncResponse>> {
    let user = db::users::get_by_login(&state.pool, &login)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", login))?;

    let mutuals = state.github.fetch_mutual_followers(&login).await?;

    let mut friend_ids = Vec::new();
    for friend_login in &mutuals {
        if let Some(friend) = db::users::get_by_login(&state.pool, friend_login)
            .await
            .db_err()?
        {
            friend_ids.push(friend.id);
        }
    }

    db::friends::replace_friends(&state.pool, user.id, &friend_ids)
        .await
        .db_err()?;

    info!(
        "Synced friends for {}: {} mutual follows, {} registered",
        login,
        mutuals.len(),
        friend_ids.len()
    );

    Ok(Json(FriendsSyncResponse {
        friends: friend_ids.len(),
    }))
}
