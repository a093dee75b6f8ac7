//! Leaderboard snapshots
//!
//! Immutable audit trail written by the weekly job, one row per ranked
//! user per period.

use chrono::NaiveDate;
use common::models::Snapshot;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Persist one user's rank at period close. A re-run of the job for the
/// same period hits the (user, period) constraint and changes nothing.
pub async fn insert_if_absent(
    pool: &PgPool,
    user_id: Uuid,
    period_start: NaiveDate,
    period_end: NaiveDate,
    rank: i32,
    score: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO snapshots (id, user_id, period_start, period_end, rank, score)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, period_start) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(period_start)
    .bind(period_end)
    .bind(rank)
    .bind(score)
    .execute(pool)
    .await?;

    Ok(())
}

/// A user's snapshot history, newest first
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Snapshot>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, period_start, period_end, rank, score, created_at
        FROM snapshots
        WHERE user_id = $1
        ORDER BY period_start DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Snapshot {
            id: r.get("id"),
            user_id: r.get("user_id"),
            period_start: r.get("period_start"),
            period_end: r.get("period_end"),
            rank: r.get("rank"),
            score: r.get("score"),
            created_at: r.get("created_at"),
        })
        .collect())
}
