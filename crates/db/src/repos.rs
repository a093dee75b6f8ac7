//! Linked repository queries

use common::models::Repository;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

fn repo_from_row(row: &PgRow) -> Repository {
    Repository {
        id: row.get("id"),
        github_id: row.get("github_id"),
        owner: row.get("owner"),
        name: row.get("name"),
        last_etag: row.get("last_etag"),
        poll_interval_secs: row.get("poll_interval_secs"),
        last_polled_at: row.get("last_polled_at"),
        created_at: row.get("created_at"),
    }
}

/// Get or create a tracked repository
pub async fn upsert(
    pool: &PgPool,
    github_id: i64,
    owner: &str,
    name: &str,
) -> Result<Repository, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO repositories (id, github_id, owner, name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (github_id) DO UPDATE
        SET owner = EXCLUDED.owner, name = EXCLUDED.name
        RETURNING id, github_id, owner, name, last_etag, poll_interval_secs,
                  last_polled_at, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(github_id)
    .bind(owner)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(repo_from_row(&row))
}

/// List all tracked repositories
pub async fn list(pool: &PgPool) -> Result<Vec<Repository>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, github_id, owner, name, last_etag, poll_interval_secs,
               last_polled_at, created_at
        FROM repositories
        ORDER BY owner, name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(repo_from_row).collect())
}

/// Persist the poller's conditional-request state after a 2xx poll
pub async fn update_poll_state(
    pool: &PgPool,
    repo_id: Uuid,
    etag: Option<&str>,
    poll_interval_secs: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE repositories
        SET last_etag = $2,
            poll_interval_secs = $3,
            last_polled_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(repo_id)
    .bind(etag)
    .bind(poll_interval_secs)
    .execute(pool)
    .await?;

    Ok(())
}

/// Touch the poll timestamp without changing the stored entity tag
/// (304 Not Modified)
pub async fn touch_polled(pool: &PgPool, repo_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE repositories SET last_polled_at = NOW() WHERE id = $1")
        .bind(repo_id)
        .execute(pool)
        .await?;

    Ok(())
}
