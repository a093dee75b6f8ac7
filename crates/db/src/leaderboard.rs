//! Leaderboard queries
//!
//! One ranking algorithm parameterized by a member-set scope: global is
//! every user, friends is the mutual-follow closure plus the user, group
//! is the membership table. Ordering is (period score DESC, time of last
//! score change ASC) so ties go to whoever reached the score first.

use common::models::{LeaderboardEntry, User};
use sqlx::PgPool;
use uuid::Uuid;

use crate::users::user_from_row;

/// Which member set to rank over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    /// A user's mutual-follow network, including the user themselves
    Friends(Uuid),
    /// Members of one group
    Group(Uuid),
}

const RANKED_SELECT: &str = r#"
SELECT u.id, u.github_id, u.login, u.avatar_url, u.lifetime_points, u.period_points,
       u.current_streak, u.longest_streak, u.last_active_date, u.score_updated_at,
       u.created_at, u.updated_at
FROM users u
"#;

const RANKED_ORDER: &str = r#"
ORDER BY u.period_points DESC, u.score_updated_at ASC
LIMIT $1
"#;

/// Rank a scope's members over current period scores.
///
/// Ranks are dense, 1-based, and recomputed fresh on every call.
pub async fn get_leaderboard(
    pool: &PgPool,
    scope: Scope,
    limit: i32,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let rows = match scope {
        Scope::Global => {
            let sql = format!("{RANKED_SELECT} WHERE u.period_points > 0 {RANKED_ORDER}");
            sqlx::query(&sql)
                .bind(limit as i64)
                .fetch_all(pool)
                .await?
        }
        Scope::Friends(user_id) => {
            let sql = format!(
                r#"{RANKED_SELECT}
                WHERE u.period_points > 0
                  AND (u.id = $2 OR u.id IN
                      (SELECT friend_user_id FROM friendships WHERE user_id = $2))
                {RANKED_ORDER}"#
            );
            sqlx::query(&sql)
                .bind(limit as i64)
                .bind(user_id)
                .fetch_all(pool)
                .await?
        }
        Scope::Group(group_id) => {
            let sql = format!(
                r#"{RANKED_SELECT}
                JOIN group_members gm ON gm.user_id = u.id
                WHERE u.period_points > 0 AND gm.group_id = $2
                {RANKED_ORDER}"#
            );
            sqlx::query(&sql)
                .bind(limit as i64)
                .bind(group_id)
                .fetch_all(pool)
                .await?
        }
    };

    let users: Vec<User> = rows.iter().map(user_from_row).collect();
    Ok(assign_ranks(users))
}

/// Assign dense 1-based ranks to an already ordered user list
pub fn assign_ranks(users: Vec<User>) -> Vec<LeaderboardEntry> {
    users
        .into_iter()
        .enumerate()
        .map(|(idx, user)| LeaderboardEntry {
            rank: (idx + 1) as i32,
            score: user.period_points,
            user,
        })
        .collect()
}
