//! Friendship (mutual-follow) queries

use sqlx::PgPool;
use uuid::Uuid;

/// Replace a user's friend set with a freshly synced mutual-follow closure
pub async fn replace_friends(
    pool: &PgPool,
    user_id: Uuid,
    friend_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM friendships WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for friend_id in friend_ids {
        sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, friend_user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Every friendship pair, for the weekly job's per-network rankings
pub async fn list_all(pool: &PgPool) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
    sqlx::query_as("SELECT user_id, friend_user_id FROM friendships")
        .fetch_all(pool)
        .await
}
