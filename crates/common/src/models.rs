//! Domain models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scored user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub github_id: i64,
    pub login: String,
    pub avatar_url: Option<String>,
    pub lifetime_points: i64,
    pub period_points: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    /// Calendar day (UTC) of the user's last countable activity
    pub last_active_date: Option<NaiveDate>,
    /// When the score last changed; leaderboard tie-break
    pub score_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A repository linked for poll-based sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: Uuid,
    pub github_id: i64,
    pub owner: String,
    pub name: String,
    pub last_etag: Option<String>,
    pub poll_interval_secs: i32,
    pub last_polled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Repository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// One externally observed unit of activity (a commit or a push),
/// ingested at most once per external id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    pub id: Uuid,
    /// Commit SHA or poll event id; globally unique
    pub external_id: String,
    pub user_id: Uuid,
    pub repo_id: Option<Uuid>,
    /// Lines changed for commits, commit count for polled pushes
    pub size_metric: i64,
    pub points: i64,
    /// Whether this event counted toward the daily cap
    pub counted: bool,
    /// 1-based sequence number of this event within the user's day
    pub day_ordinal: i32,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Per-user per-day activity aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub total_events: i32,
    pub counted_events: i32,
    pub points: i64,
}

/// Append-only record of a streak bonus credit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakBonus {
    pub id: Uuid,
    pub user_id: Uuid,
    pub streak_day: i32,
    pub bonus_points: i64,
    pub milestone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Which member set a leaderboard ranks over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrophyScope {
    Global,
    Friends,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrophyTier {
    Gold,
    Silver,
    Bronze,
}

impl TrophyTier {
    /// Tier for a 1-based podium rank
    pub fn for_rank(rank: i32) -> Option<TrophyTier> {
        match rank {
            1 => Some(TrophyTier::Gold),
            2 => Some(TrophyTier::Silver),
            3 => Some(TrophyTier::Bronze),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrophyTier::Gold => "gold",
            TrophyTier::Silver => "silver",
            TrophyTier::Bronze => "bronze",
        }
    }
}

impl TrophyScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrophyScope::Global => "global",
            TrophyScope::Friends => "friends",
            TrophyScope::Group => "group",
        }
    }
}

/// A trophy awarded at period close; one per (user, scope, period)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trophy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub scope: TrophyScope,
    pub group_id: Option<Uuid>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub rank: i32,
    pub tier: TrophyTier,
    pub score: i64,
}

/// Point-in-time record of a user's rank, written by the weekly job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub rank: i32,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

/// A named collection of users joined by invite code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub invite_code: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Owner,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Owner => "owner",
            GroupRole::Member => "member",
        }
    }
}

/// Leaderboard entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i32,
    pub user: User,
    pub score: i64,
}
