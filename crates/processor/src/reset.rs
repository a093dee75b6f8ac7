//! Weekly ranking, trophy and snapshot job
//!
//! Runs once per period (cron-triggered). Order matters: trophies and
//! snapshots are durably written before any period counter is reset —
//! reversing that loses the data the awards are computed from. The job
//! does not assume it runs exactly once; every write is insert-if-absent,
//! so a double invocation awards nothing twice.

use std::collections::{HashMap, HashSet};

use chrono::Duration;
use common::models::{TrophyScope, TrophyTier, User};
use common::{Clock, Error};
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

/// What the job did, for the caller's response body and logs
#[derive(Debug, Default, serde::Serialize)]
pub struct ResetSummary {
    pub users_processed: usize,
    pub global_trophies: usize,
    pub friends_trophies: usize,
    pub group_trophies: usize,
    pub subsets_failed: usize,
    pub users_reset: u64,
}

/// Close out the current period: rank, award, snapshot, reset.
pub async fn run_weekly_reset(pool: &PgPool, clock: &dyn Clock) -> Result<ResetSummary, Error> {
    let period_end = clock.today();
    let period_start = period_end - Duration::days(7);

    info!("Weekly reset for period {} to {}", period_start, period_end);

    // Full ordering over everyone who scored this period; the tie-break
    // (score_updated_at ASC) is baked into the query.
    let ranked = db::users::list_ranked_for_period(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    if ranked.is_empty() {
        info!("No users with scores this period, nothing to do");
        return Ok(ResetSummary::default());
    }

    let mut summary = ResetSummary {
        users_processed: ranked.len(),
        ..Default::default()
    };

    // Global podium
    for (idx, user) in ranked.iter().take(3).enumerate() {
        let rank = idx as i32 + 1;
        let Some(tier) = TrophyTier::for_rank(rank) else {
            break;
        };
        let fresh = db::trophies::award_if_absent(
            pool,
            user.id,
            TrophyScope::Global,
            None,
            period_start,
            period_end,
            rank,
            tier,
            user.period_points,
        )
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if fresh {
            info!(
                "Awarded {} trophy to {} (global rank {})",
                tier.as_str(),
                user.login,
                rank
            );
            summary.global_trophies += 1;
        }
    }

    // Friend networks: one restricted ranking per user who has friends.
    // A failing network is logged and skipped; it must not block the rest
    // of the cycle.
    match db::friends::list_all(pool).await {
        Ok(pairs) => {
            let mut networks: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
            for (user_id, friend_id) in pairs {
                networks.entry(user_id).or_default().insert(friend_id);
            }

            for (user_id, mut members) in networks {
                members.insert(user_id);
                match award_subset(
                    pool,
                    &ranked,
                    &members,
                    TrophyScope::Friends,
                    None,
                    period_start,
                    period_end,
                )
                .await
                {
                    Ok(awarded) => summary.friends_trophies += awarded,
                    Err(e) => {
                        warn!("Friends ranking failed for {}: {}", user_id, e);
                        summary.subsets_failed += 1;
                    }
                }
            }
        }
        Err(e) => {
            warn!("Skipping friends trophies, friendship query failed: {}", e);
            summary.subsets_failed += 1;
        }
    }

    // Groups: same restricted ranking over the membership table
    match db::groups::list_all_ids(pool).await {
        Ok(group_ids) => {
            for group_id in group_ids {
                let result = async {
                    let members: HashSet<Uuid> = db::groups::member_ids(pool, group_id)
                        .await?
                        .into_iter()
                        .collect();
                    award_subset(
                        pool,
                        &ranked,
                        &members,
                        TrophyScope::Group,
                        Some(group_id),
                        period_start,
                        period_end,
                    )
                    .await
                }
                .await;

                match result {
                    Ok(awarded) => summary.group_trophies += awarded,
                    Err(e) => {
                        warn!("Group ranking failed for {}: {}", group_id, e);
                        summary.subsets_failed += 1;
                    }
                }
            }
        }
        Err(e) => {
            warn!("Skipping group trophies, group query failed: {}", e);
            summary.subsets_failed += 1;
        }
    }

    // Snapshots are the audit trail the reset depends on: any failure
    // here aborts before the reset rather than losing the period's data.
    for (idx, user) in ranked.iter().enumerate() {
        db::snapshots::insert_if_absent(
            pool,
            user.id,
            period_start,
            period_end,
            idx as i32 + 1,
            user.period_points,
        )
        .await
        .map_err(|e| {
            error!("Snapshot write failed for {}: {}", user.login, e);
            Error::Database(e.to_string())
        })?;
    }

    // Only now is it safe to open the next period
    summary.users_reset = db::users::reset_period_points(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    info!(
        "Weekly reset complete: {} users, {} global / {} friends / {} group trophies, {} subsets failed",
        summary.users_processed,
        summary.global_trophies,
        summary.friends_trophies,
        summary.group_trophies,
        summary.subsets_failed
    );

    Ok(summary)
}

/// Award podium trophies for one member subset, reusing the already
/// ordered global ranking. Returns how many trophies were newly inserted.
async fn award_subset(
    pool: &PgPool,
    ranked: &[User],
    members: &HashSet<Uuid>,
    scope: TrophyScope,
    group_id: Option<Uuid>,
    period_start: chrono::NaiveDate,
    period_end: chrono::NaiveDate,
) -> Result<usize, sqlx::Error> {
    let mut awarded = 0;

    for (idx, user) in ranked
        .iter()
        .filter(|u| members.contains(&u.id))
        .take(3)
        .enumerate()
    {
        let rank = idx as i32 + 1;
        let Some(tier) = TrophyTier::for_rank(rank) else {
            break;
        };
        let fresh = db::trophies::award_if_absent(
            pool,
            user.id,
            scope,
            group_id,
            period_start,
            period_end,
            rank,
            tier,
            user.period_points,
        )
        .await?;

        if fresh {
            awarded += 1;
        }
    }

    Ok(awarded)
}
