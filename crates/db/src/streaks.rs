//! Streak bonus log
//!
//! Append-only: user point totals must always be reconstructable as
//! sum(push_events.points where counted) + sum(streak_bonuses.bonus_points).

use common::models::StreakBonus;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

/// Append one bonus credit to the log
pub async fn insert_bonus(
    conn: &mut PgConnection,
    user_id: Uuid,
    streak_day: i32,
    bonus_points: i64,
    milestone: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO streak_bonuses (id, user_id, streak_day, bonus_points, milestone)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(streak_day)
    .bind(bonus_points)
    .bind(milestone)
    .execute(conn)
    .await?;

    Ok(())
}

/// A user's bonus history, newest first
pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i32,
) -> Result<Vec<StreakBonus>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, streak_day, bonus_points, milestone, created_at
        FROM streak_bonuses
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| StreakBonus {
            id: r.get("id"),
            user_id: r.get("user_id"),
            streak_day: r.get("streak_day"),
            bonus_points: r.get("bonus_points"),
            milestone: r.get("milestone"),
            created_at: r.get("created_at"),
        })
        .collect())
}
