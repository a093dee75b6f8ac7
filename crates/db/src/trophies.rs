//! Trophy queries
//!
//! One trophy per (user, scope, period). The unique constraint, not the
//! caller, is what makes re-running the weekly job safe.

use chrono::NaiveDate;
use common::models::{Trophy, TrophyScope, TrophyTier};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Award a trophy unless one already exists for this (user, scope, period).
/// Returns true when a new trophy was inserted.
#[allow(clippy::too_many_arguments)]
pub async fn award_if_absent(
    pool: &PgPool,
    user_id: Uuid,
    scope: TrophyScope,
    group_id: Option<Uuid>,
    period_start: NaiveDate,
    period_end: NaiveDate,
    rank: i32,
    tier: TrophyTier,
    score: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO trophies
            (id, user_id, scope, group_id, period_start, period_end, rank, tier, score)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (user_id, scope, period_start) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(scope.as_str())
    .bind(group_id)
    .bind(period_start)
    .bind(period_end)
    .bind(rank)
    .bind(tier.as_str())
    .bind(score)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn scope_from_str(s: &str) -> TrophyScope {
    match s {
        "friends" => TrophyScope::Friends,
        "group" => TrophyScope::Group,
        _ => TrophyScope::Global,
    }
}

fn tier_from_str(s: &str) -> TrophyTier {
    match s {
        "gold" => TrophyTier::Gold,
        "silver" => TrophyTier::Silver,
        _ => TrophyTier::Bronze,
    }
}

/// All trophies for a user, newest period first
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Trophy>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, scope, group_id, period_start, period_end, rank, tier, score
        FROM trophies
        WHERE user_id = $1
        ORDER BY period_start DESC, scope
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Trophy {
            id: r.get("id"),
            user_id: r.get("user_id"),
            scope: scope_from_str(r.get("scope")),
            group_id: r.get("group_id"),
            period_start: r.get("period_start"),
            period_end: r.get("period_end"),
            rank: r.get("rank"),
            tier: tier_from_str(r.get("tier")),
            score: r.get("score"),
        })
        .collect())
}

