#[cfg(test)]
mod tests {
    use crate::streak::{advance, StreakState};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn state(current: i32, last: Option<NaiveDate>) -> StreakState {
        StreakState {
            current_streak: current,
            last_active_date: last,
        }
    }

    #[test]
    fn test_first_ever_activity_starts_at_one() {
        let t = advance(&state(0, None), day(1)).unwrap();
        assert_eq!(t.new_streak, 1);
        assert_eq!(t.bonus_points, 1);
        assert_eq!(t.milestone, None);
    }

    #[test]
    fn test_consecutive_days_increment() {
        let mut s = state(0, None);
        for d in 1..=3 {
            let t = advance(&s, day(d)).unwrap();
            s = state(t.new_streak, Some(day(d)));
        }
        assert_eq!(s.current_streak, 3);
    }

    #[test]
    fn test_same_day_is_noop() {
        assert_eq!(advance(&state(4, Some(day(5))), day(5)), None);
    }

    #[test]
    fn test_gap_resets_to_one() {
        // Active through day 3, skips day 4, resumes day 5
        let t = advance(&state(3, Some(day(3))), day(5)).unwrap();
        assert_eq!(t.new_streak, 1);
        // Reset days still earn the base bonus
        assert_eq!(t.bonus_points, 1);
    }

    #[test]
    fn test_future_last_active_date_is_noop() {
        assert_eq!(advance(&state(2, Some(day(9))), day(8)), None);
    }

    #[test]
    fn test_milestone_awarded_exactly_at_seven() {
        let t = advance(&state(6, Some(day(6))), day(7)).unwrap();
        assert_eq!(t.new_streak, 7);
        assert_eq!(t.bonus_points, 1 + 5);
        assert_eq!(t.milestone, Some("weekly"));
    }

    #[test]
    fn test_no_milestone_at_eight_or_fourteen() {
        let t = advance(&state(7, Some(day(7))), day(8)).unwrap();
        assert_eq!(t.new_streak, 8);
        assert_eq!(t.bonus_points, 1);
        assert_eq!(t.milestone, None);

        let t = advance(&state(13, Some(day(13))), day(14)).unwrap();
        assert_eq!(t.new_streak, 14);
        assert_eq!(t.bonus_points, 1);
        assert_eq!(t.milestone, None);
    }

    #[test]
    fn test_streak_plateau_cannot_re_award_milestone() {
        // A same-day recompute at streak 7 produces no transition at all,
        // so the milestone cannot be paid twice.
        assert_eq!(advance(&state(7, Some(day(7))), day(7)), None);
    }

    #[test]
    fn test_thirty_day_milestone() {
        let t = advance(
            &state(29, Some(day(29))),
            NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(),
        )
        .unwrap();
        assert_eq!(t.new_streak, 30);
        assert_eq!(t.bonus_points, 1 + 10);
        assert_eq!(t.milestone, Some("monthly"));
    }

    #[test]
    fn test_longest_streak_tracking_never_decreases() {
        // The engine stores longest via GREATEST(longest, new); a reset
        // transition to 1 must therefore leave a prior longest of 3 alone.
        let t = advance(&state(3, Some(day(3))), day(5)).unwrap();
        let longest_before = 3;
        let longest_after = longest_before.max(t.new_streak);
        assert_eq!(longest_after, 3);
    }
}
