//! User queries

use chrono::NaiveDate;
use common::models::User;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, github_id, login, avatar_url, lifetime_points, period_points, \
     current_streak, longest_streak, last_active_date, score_updated_at, created_at, updated_at";

pub(crate) fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        github_id: row.get("github_id"),
        login: row.get("login"),
        avatar_url: row.get("avatar_url"),
        lifetime_points: row.get("lifetime_points"),
        period_points: row.get("period_points"),
        current_streak: row.get("current_streak"),
        longest_streak: row.get("longest_streak"),
        last_active_date: row.get("last_active_date"),
        score_updated_at: row.get("score_updated_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Get or create a user from their external GitHub identity
pub async fn upsert(
    pool: &PgPool,
    github_id: i64,
    login: &str,
    avatar_url: Option<&str>,
) -> Result<User, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO users (id, github_id, login, avatar_url)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (github_id) DO UPDATE
        SET login = EXCLUDED.login,
            avatar_url = EXCLUDED.avatar_url,
            updated_at = NOW()
        RETURNING {USER_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(github_id)
        .bind(login)
        .bind(avatar_url)
        .fetch_one(pool)
        .await?;

    Ok(user_from_row(&row))
}

/// Get user by GitHub login
pub async fn get_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE login = $1");
    let row = sqlx::query(&sql).bind(login).fetch_optional(pool).await?;
    Ok(row.as_ref().map(user_from_row))
}

/// Get user by ID
pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(user_from_row))
}

/// Credit points to both running totals in a single atomic update.
///
/// This is the one accounting path for event points and streak bonuses
/// alike. `score_updated_at` moves with every credit and is the
/// leaderboard tie-break, so ties order by who scored first.
pub async fn credit_points(
    conn: &mut PgConnection,
    user_id: Uuid,
    points: i64,
) -> Result<User, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE users
        SET lifetime_points = lifetime_points + $2,
            period_points = period_points + $2,
            score_updated_at = NOW(),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(points)
        .fetch_one(conn)
        .await?;

    Ok(user_from_row(&row))
}

/// Persist a streak transition, claiming the day atomically.
///
/// The guard on `last_active_date` means exactly one of several
/// concurrent same-day events wins the transition; the others see zero
/// rows and skip the bonus. `longest_streak` never decreases.
pub async fn apply_streak(
    conn: &mut PgConnection,
    user_id: Uuid,
    current_streak: i32,
    active_date: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET current_streak = $2,
            longest_streak = GREATEST(longest_streak, $2),
            last_active_date = $3,
            updated_at = NOW()
        WHERE id = $1
          AND (last_active_date IS NULL OR last_active_date < $3)
        "#,
    )
    .bind(user_id)
    .bind(current_streak)
    .bind(active_date)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All users with a non-zero period score, in ranking order
/// (score descending, earliest scorer first on ties)
pub async fn list_ranked_for_period(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE period_points > 0
        ORDER BY period_points DESC, score_updated_at ASC
        "#
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(user_from_row).collect())
}

/// Zero every user's period score. Runs only after the period's trophies
/// and snapshots are durably recorded.
pub async fn reset_period_points(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET period_points = 0 WHERE period_points <> 0")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
