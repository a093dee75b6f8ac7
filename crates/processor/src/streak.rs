//! Streak state machine
//!
//! A user's streak state is `(current_streak, last_active_date)`. The
//! transition fires on the first countable event of a new calendar day;
//! later events the same day are no-ops. All dates are UTC calendar days
//! supplied by the caller's clock.

use chrono::NaiveDate;

/// Base bonus for any new active day
pub const DAILY_BONUS: i64 = 1;

/// Extra bonus when the streak first reaches a milestone length
const MILESTONES: &[(i32, i64, &str)] = &[
    (7, 5, "weekly"),
    (30, 10, "monthly"),
    (90, 20, "quarterly"),
    (365, 50, "yearly"),
];

/// Streak fields as currently stored on the user
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakState {
    pub current_streak: i32,
    pub last_active_date: Option<NaiveDate>,
}

/// The result of a day transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakTransition {
    /// Streak length after the transition
    pub new_streak: i32,
    /// Total bonus to credit: base + milestone (if any)
    pub bonus_points: i64,
    /// Milestone label when `new_streak` hit a threshold exactly
    pub milestone: Option<&'static str>,
}

/// Advance the streak for activity on `today`.
///
/// `None` means no transition: the day was already credited (or the
/// stored date is ahead of `today`, which can only happen on clock skew
/// and is treated the same way).
pub fn advance(state: &StreakState, today: NaiveDate) -> Option<StreakTransition> {
    let new_streak = match state.last_active_date {
        Some(last) if last >= today => return None,
        Some(last) if (today - last).num_days() == 1 => state.current_streak + 1,
        _ => 1,
    };

    let milestone = MILESTONES
        .iter()
        .find(|(day, _, _)| *day == new_streak)
        .map(|(_, bonus, label)| (*bonus, *label));

    Some(StreakTransition {
        new_streak,
        bonus_points: DAILY_BONUS + milestone.map(|(bonus, _)| bonus).unwrap_or(0),
        milestone: milestone.map(|(_, label)| label),
    })
}
