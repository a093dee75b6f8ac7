//! Group routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, DbResultExt, OptionExt};
use crate::state::AppState;
use common::models::{Group, GroupRole};

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    /// Login of the creating user; becomes the group owner
    pub creator: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinGroupRequest {
    pub invite_code: String,
    pub login: String,
}

#[derive(Debug, Serialize)]
pub struct GroupWithMembers {
    #[serde(flatten)]
    pub group: Group,
    pub member_count: i64,
}

/// Create a group; the creator joins as owner
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Group name is required".to_string()));
    }

    let creator = db::users::get_by_login(&state.pool, &req.creator)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", req.creator))?;

    let group = db::groups::create_group(&state.pool, name, req.description.as_deref(), creator.id)
        .await
        .db_err()?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// Join a group by invite code; joining twice is a no-op
pub async fn join(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JoinGroupRequest>,
) -> ApiResult<Json<Group>> {
    let user = db::users::get_by_login(&state.pool, &req.login)
        .await
        .db_err()?
        .not_found(format!("User '{}' not found", req.login))?;

    let group = db::groups::get_by_invite_code(&state.pool, &req.invite_code)
        .await
        .db_err()?
        .not_found("No group with that invite code")?;

    db::groups::add_member(&state.pool, group.id, user.id, GroupRole::Member)
        .await
        .db_err()?;

    Ok(Json(group))
}

/// Group details with member count
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<Uuid>,
) -> ApiResult<Json<GroupWithMembers>> {
    let group = db::groups::get_group(&state.pool, group_id)
        .await
        .db_err()?
        .not_found(format!("Group '{}' not found", group_id))?;

    let member_count = db::groups::member_count(&state.pool, group_id)
        .await
        .db_err()?;

    Ok(Json(GroupWithMembers {
        group,
        member_count,
    }))
}
