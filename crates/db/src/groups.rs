//! Group management queries

use common::invite::generate_invite_code;
use common::models::{Group, GroupRole};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

const CODE_ATTEMPTS: usize = 10;

fn group_from_row(row: &PgRow) -> Group {
    Group {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        invite_code: row.get("invite_code"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

/// Create a group with a fresh invite code; the creator joins as owner.
///
/// Codes are regenerated on collision with an existing group's code.
pub async fn create_group(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    created_by: Uuid,
) -> Result<Group, sqlx::Error> {
    let mut invite_code = generate_invite_code();
    for _ in 0..CODE_ATTEMPTS {
        if get_by_invite_code(pool, &invite_code).await?.is_none() {
            break;
        }
        debug!("Invite code collision, regenerating");
        invite_code = generate_invite_code();
    }

    let mut tx = pool.begin().await?;

    let row = sqlx::query(
        r#"
        INSERT INTO groups (id, name, description, invite_code, created_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, description, invite_code, created_by, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(&invite_code)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await?;

    let group = group_from_row(&row);

    sqlx::query(
        r#"
        INSERT INTO group_members (group_id, user_id, role)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(group.id)
    .bind(created_by)
    .bind(GroupRole::Owner.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(group)
}

/// Get a group by ID
pub async fn get_group(pool: &PgPool, group_id: Uuid) -> Result<Option<Group>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, invite_code, created_by, created_at
        FROM groups
        WHERE id = $1
        "#,
    )
    .bind(group_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(group_from_row))
}

/// Get a group by its invite code
pub async fn get_by_invite_code(
    pool: &PgPool,
    invite_code: &str,
) -> Result<Option<Group>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, invite_code, created_by, created_at
        FROM groups
        WHERE invite_code = $1
        "#,
    )
    .bind(invite_code)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(group_from_row))
}

/// Add a user to a group; joining twice is a no-op
pub async fn add_member(
    pool: &PgPool,
    group_id: Uuid,
    user_id: Uuid,
    role: GroupRole,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO group_members (group_id, user_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT (group_id, user_id) DO NOTHING
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// All groups a user belongs to
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Group>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT g.id, g.name, g.description, g.invite_code, g.created_by, g.created_at
        FROM groups g
        JOIN group_members gm ON gm.group_id = g.id
        WHERE gm.user_id = $1
        ORDER BY g.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(group_from_row).collect())
}

/// Ids of every group, for the weekly job's per-group rankings
pub async fn list_all_ids(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM groups ORDER BY created_at")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Member ids for one group
pub async fn member_ids(pool: &PgPool, group_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT user_id FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Member count for one group
pub async fn member_count(pool: &PgPool, group_id: Uuid) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM group_members WHERE group_id = $1")
        .bind(group_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}
