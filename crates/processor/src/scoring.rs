//! Scoring policy and daily cap
//!
//! Pure functions only: event attributes in, points out. Which policy a
//! deployment runs with is fixed once at configuration time and applied
//! uniformly to every event.

use common::config::ScoringMode;

/// Maps an event's size metric to points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringPolicy {
    /// 1-5 points by size tier: ≤10 → 1, ≤50 → 2, ≤150 → 3, ≤300 → 4,
    /// larger → 5
    Tiered,
    /// Every event is worth 1 point regardless of size
    Flat,
}

impl From<ScoringMode> for ScoringPolicy {
    fn from(mode: ScoringMode) -> Self {
        match mode {
            ScoringMode::Tiered => ScoringPolicy::Tiered,
            ScoringMode::Flat => ScoringPolicy::Flat,
        }
    }
}

impl ScoringPolicy {
    /// Points for a size metric (lines changed, or commit count).
    ///
    /// Total over all inputs: negative or missing sizes normalize to 0.
    /// Monotonic non-decreasing in the size.
    pub fn points(&self, size_metric: i64) -> i64 {
        let size = size_metric.max(0);
        match self {
            ScoringPolicy::Flat => 1,
            ScoringPolicy::Tiered => match size {
                0..=10 => 1,
                11..=50 => 2,
                51..=150 => 3,
                151..=300 => 4,
                _ => 5,
            },
        }
    }
}

/// Whether the n-th event of a user's day counts toward score.
///
/// `day_ordinal` is 1-based; the first `max_daily_counted` events count,
/// later ones are stored but never credited.
pub fn should_count(day_ordinal: i32, max_daily_counted: i32) -> bool {
    day_ordinal <= max_daily_counted
}
