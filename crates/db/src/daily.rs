//! Daily summary counters
//!
//! The per-user-per-day counter assigns event ordinals. The upsert
//! increments and returns in one statement, so two concurrent events for
//! the same user can never observe the same pre-increment value.

use chrono::NaiveDate;
use common::models::DailySummary;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

/// Count one ingested event and return its 1-based ordinal within the
/// user's day. Increments exactly once per event, counted or not.
pub async fn next_ordinal(
    conn: &mut PgConnection,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<i32, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO daily_summaries (user_id, date, total_events)
        VALUES ($1, $2, 1)
        ON CONFLICT (user_id, date) DO UPDATE
        SET total_events = daily_summaries.total_events + 1
        RETURNING total_events
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(conn)
    .await?;

    Ok(row.get::<i32, _>("total_events"))
}

/// Record that an event counted toward the cap and fold its points into
/// the day's aggregate.
pub async fn record_counted(
    conn: &mut PgConnection,
    user_id: Uuid,
    date: NaiveDate,
    points: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE daily_summaries
        SET counted_events = counted_events + 1,
            points = points + $3
        WHERE user_id = $1 AND date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(points)
    .execute(conn)
    .await?;

    Ok(())
}

/// Load a user's summary for one day
pub async fn get(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Option<DailySummary>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT user_id, date, total_events, counted_events, points
        FROM daily_summaries
        WHERE user_id = $1 AND date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| DailySummary {
        user_id: r.get("user_id"),
        date: r.get("date"),
        total_events: r.get("total_events"),
        counted_events: r.get("counted_events"),
        points: r.get("points"),
    }))
}
