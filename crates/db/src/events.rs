//! Push event persistence
//!
//! The `external_id` unique constraint is the at-most-once ingestion
//! guarantee: a redelivered webhook or re-polled event hits the conflict
//! and changes nothing.

use chrono::{DateTime, Utc};
use common::models::PushEvent;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

/// A normalized event ready to persist, before cap accounting
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub external_id: String,
    pub user_id: Uuid,
    pub repo_id: Option<Uuid>,
    pub size_metric: i64,
    pub points: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Insert an event unless its external id was already seen.
///
/// Returns the new row id, or `None` on conflict (duplicate delivery).
/// Ordinal and counted flag are finalized by [`finalize`] within the same
/// transaction, once the daily counter has assigned them.
pub async fn insert_if_new(
    conn: &mut PgConnection,
    event: &NewEvent,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO push_events
            (id, external_id, user_id, repo_id, size_metric, points, occurred_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (external_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&event.external_id)
    .bind(event.user_id)
    .bind(event.repo_id)
    .bind(event.size_metric)
    .bind(event.points)
    .bind(event.occurred_at)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(|r| r.get("id")))
}

/// Fix the event's day ordinal and counted flag. Called exactly once per
/// inserted event; the fields are never revised afterwards.
pub async fn finalize(
    conn: &mut PgConnection,
    event_id: Uuid,
    day_ordinal: i32,
    counted: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE push_events
        SET day_ordinal = $2, counted = $3
        WHERE id = $1
        "#,
    )
    .bind(event_id)
    .bind(day_ordinal)
    .bind(counted)
    .execute(conn)
    .await?;

    Ok(())
}

/// Load one event by row id
pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<PushEvent>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, external_id, user_id, repo_id, size_metric, points,
               counted, day_ordinal, occurred_at, created_at
        FROM push_events
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| PushEvent {
        id: r.get("id"),
        external_id: r.get("external_id"),
        user_id: r.get("user_id"),
        repo_id: r.get("repo_id"),
        size_metric: r.get("size_metric"),
        points: r.get("points"),
        counted: r.get("counted"),
        day_ordinal: r.get("day_ordinal"),
        occurred_at: r.get("occurred_at"),
        created_at: r.get("created_at"),
    }))
}

/// Recent events for a user, newest first
pub async fn list_recent_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i32,
) -> Result<Vec<PushEvent>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, external_id, user_id, repo_id, size_metric, points,
               counted, day_ordinal, occurred_at, created_at
        FROM push_events
        WHERE user_id = $1
        ORDER BY occurred_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| PushEvent {
            id: r.get("id"),
            external_id: r.get("external_id"),
            user_id: r.get("user_id"),
            repo_id: r.get("repo_id"),
            size_metric: r.get("size_metric"),
            points: r.get("points"),
            counted: r.get("counted"),
            day_ordinal: r.get("day_ordinal"),
            occurred_at: r.get("occurred_at"),
            created_at: r.get("created_at"),
        })
        .collect())
}
