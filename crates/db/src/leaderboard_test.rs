#[cfg(test)]
mod tests {
    use crate::leaderboard::assign_ranks;
    use chrono::{TimeZone, Utc};
    use common::models::User;
    use uuid::Uuid;

    fn make_user(login: &str, period_points: i64, scored_at_minute: u32) -> User {
        let t = Utc
            .with_ymd_and_hms(2026, 2, 1, 12, scored_at_minute, 0)
            .unwrap();
        User {
            id: Uuid::new_v4(),
            github_id: 1,
            login: login.to_string(),
            avatar_url: None,
            lifetime_points: period_points,
            period_points,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
            score_updated_at: t,
            created_at: t,
            updated_at: t,
        }
    }

    #[test]
    fn test_ranks_are_dense_and_one_based() {
        let users = vec![
            make_user("first", 30, 0),
            make_user("second", 20, 1),
            make_user("third", 20, 2),
            make_user("fourth", 5, 3),
        ];
        let entries = assign_ranks(users);

        let ranks: Vec<i32> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_score_is_period_score() {
        let entries = assign_ranks(vec![make_user("solo", 42, 0)]);
        assert_eq!(entries[0].score, 42);
    }

    #[test]
    fn test_rank_assignment_preserves_query_order() {
        // The query orders ties by score_updated_at ASC; rank assignment
        // must not reorder, so repeated calls over the same data give the
        // same podium.
        let users = vec![
            make_user("earlier", 20, 1),
            make_user("later", 20, 2),
        ];
        let entries = assign_ranks(users);

        assert_eq!(entries[0].user.login, "earlier");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].user.login, "later");
        assert_eq!(entries[1].rank, 2);
    }

    #[test]
    fn test_empty_board() {
        assert!(assign_ranks(vec![]).is_empty());
    }
}
