#[cfg(test)]
mod tests {
    use crate::scoring::{should_count, ScoringPolicy};

    #[test]
    fn test_tier_boundaries() {
        let policy = ScoringPolicy::Tiered;
        assert_eq!(policy.points(0), 1);
        assert_eq!(policy.points(10), 1);
        assert_eq!(policy.points(11), 2);
        assert_eq!(policy.points(50), 2);
        assert_eq!(policy.points(51), 3);
        assert_eq!(policy.points(150), 3);
        assert_eq!(policy.points(151), 4);
        assert_eq!(policy.points(300), 4);
        assert_eq!(policy.points(301), 5);
        assert_eq!(policy.points(100_000), 5);
    }

    #[test]
    fn test_negative_size_normalizes_to_zero() {
        assert_eq!(ScoringPolicy::Tiered.points(-50), 1);
        assert_eq!(ScoringPolicy::Flat.points(-1), 1);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let policy = ScoringPolicy::Tiered;
        let mut last = 0;
        for size in 0..500 {
            let p = policy.points(size);
            assert!(p >= last, "points({}) = {} dropped below {}", size, p, last);
            last = p;
        }
    }

    #[test]
    fn test_flat_policy_ignores_size() {
        let policy = ScoringPolicy::Flat;
        for size in [0, 1, 10, 300, 10_000] {
            assert_eq!(policy.points(size), 1);
        }
    }

    #[test]
    fn test_cap_counts_first_n_only() {
        let max = 5;
        for ordinal in 1..=5 {
            assert!(should_count(ordinal, max));
        }
        assert!(!should_count(6, max));
        assert!(!should_count(100, max));
    }

    /// Six commits in one day with sizes [5, 15, 60, 200, 400, 5] score
    /// [1, 2, 3, 4, 5, 1]; with a cap of 5 only the first five credit,
    /// totalling 15 points.
    #[test]
    fn test_six_commit_day_scenario() {
        let policy = ScoringPolicy::Tiered;
        let sizes = [5i64, 15, 60, 200, 400, 5];
        let points: Vec<i64> = sizes.iter().map(|&s| policy.points(s)).collect();
        assert_eq!(points, vec![1, 2, 3, 4, 5, 1]);

        let credited: i64 = points
            .iter()
            .enumerate()
            .filter(|(idx, _)| should_count(*idx as i32 + 1, 5))
            .map(|(_, p)| p)
            .sum();
        assert_eq!(credited, 15);
    }
}
