//! Event ingestion
//!
//! Raw webhook pushes and polled push events are normalized into one
//! canonical shape at this boundary, then run through the same pipeline:
//! dedup insert → score → day ordinal → conditional credit → streak.
//! Optional-field ambiguity from external payloads stops at the
//! normalizers; nothing downstream sees a missing field.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::models::{PushEvent, User};
use common::{Clock, Config, Error};
use github::events::{PollEvent, PushCommit, PushWebhookEvent};
use github::{GitHubClient, WebhookPayload};
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::scoring::{should_count, ScoringPolicy};
use crate::streak;

/// The user identity attached to a raw event
#[derive(Debug, Clone)]
pub struct ActorRef {
    pub github_id: i64,
    pub login: String,
    pub avatar_url: Option<String>,
}

/// The repository a raw event belongs to
#[derive(Debug, Clone)]
pub struct RepoRef {
    pub github_id: i64,
    pub owner: String,
    pub name: String,
}

/// Canonical event shape produced by the boundary normalizers
#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    /// Commit SHA or poll event id; the dedup key
    pub external_id: String,
    /// GitHub login of the user who gets the points
    pub author_login: String,
    /// Identity carried by the payload itself, when its login matches
    /// the author (webhook sender, poll actor)
    pub actor: Option<ActorRef>,
    pub repo: Option<RepoRef>,
    /// `None` means the payload had no size data; ingestion enriches or
    /// falls back to 0
    pub size_metric: Option<i64>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NormalizedEvent {
    /// Normalize one commit of a push webhook. `None` when the commit
    /// carries no GitHub login (commits authored outside GitHub).
    pub fn from_push_commit(event: &PushWebhookEvent, commit: &PushCommit) -> Option<Self> {
        let author_login = commit.author.as_ref()?.username.clone()?;

        let actor = (event.sender.login == author_login).then(|| ActorRef {
            github_id: event.sender.id,
            login: event.sender.login.clone(),
            avatar_url: event.sender.avatar_url.clone(),
        });

        let repo = event.repository.full_name.split_once('/').map(|(owner, name)| RepoRef {
            github_id: event.repository.id,
            owner: owner.to_string(),
            name: name.to_string(),
        });

        Some(Self {
            external_id: commit.id.clone(),
            author_login,
            actor,
            repo,
            // Push payloads carry no diff stats
            size_metric: None,
            occurred_at: commit.timestamp,
        })
    }

    /// Normalize one polled push event. The commit count is the size
    /// metric; the poll feed exposes no diff stats.
    pub fn from_poll_event(event: &PollEvent, repo: Option<RepoRef>) -> Self {
        Self {
            external_id: event.id.clone(),
            author_login: event.actor.login.clone(),
            actor: Some(ActorRef {
                github_id: event.actor.id,
                login: event.actor.login.clone(),
                avatar_url: event.actor.avatar_url.clone(),
            }),
            repo,
            size_metric: Some(event.payload.size),
            occurred_at: Some(event.created_at),
        }
    }
}

/// Result of one ingestion attempt
#[derive(Debug)]
pub struct IngestOutcome {
    /// False for duplicates: the external id was already processed
    pub accepted: bool,
    pub event: Option<PushEvent>,
}

/// Totals over a batch of raw events (one webhook delivery, one poll page)
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub accepted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Runs the ingestion pipeline
pub struct EventIngestor {
    pool: PgPool,
    client: GitHubClient,
    policy: ScoringPolicy,
    max_daily_counted: i32,
    clock: Arc<dyn Clock>,
}

impl EventIngestor {
    pub fn new(pool: PgPool, config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            client: GitHubClient::new(config.github_token.clone()),
            policy: config.scoring.into(),
            max_daily_counted: config.max_daily_counted,
            clock,
        }
    }

    /// Process a parsed webhook payload. Non-push events are acknowledged
    /// and ignored.
    pub async fn handle_webhook(&self, payload: WebhookPayload) -> Result<IngestSummary, Error> {
        match payload {
            WebhookPayload::Ping { zen } => {
                info!("Received ping: {}", zen);
                Ok(IngestSummary::default())
            }
            WebhookPayload::Unknown { event_type } => {
                debug!("Ignoring {} event", event_type);
                Ok(IngestSummary::default())
            }
            WebhookPayload::Push(event) => {
                info!(
                    "Push to {} with {} commits",
                    event.repository.full_name,
                    event.commits.len()
                );

                let mut summary = IngestSummary::default();
                for commit in &event.commits {
                    match NormalizedEvent::from_push_commit(&event, commit) {
                        Some(normalized) => match self.ingest(normalized).await {
                            Ok(outcome) if outcome.accepted => summary.accepted += 1,
                            Ok(_) => summary.duplicates += 1,
                            Err(e) => {
                                warn!("Skipping commit {}: {}", commit.id, e);
                                summary.skipped += 1;
                            }
                        },
                        None => {
                            debug!("Commit {} has no GitHub author, skipping", commit.id);
                            summary.skipped += 1;
                        }
                    }
                }
                Ok(summary)
            }
        }
    }

    /// Ingest one canonical event: at most once per external id.
    ///
    /// On a fresh event this scores, assigns the day ordinal, credits the
    /// user if under the cap, and advances the streak — synchronously,
    /// before returning. A duplicate returns `accepted: false` with no
    /// side effects at all.
    pub async fn ingest(&self, normalized: NormalizedEvent) -> Result<IngestOutcome, Error> {
        let user = self.resolve_user(&normalized).await?;

        let repo_id = match &normalized.repo {
            Some(repo) => Some(
                db::repos::upsert(&self.pool, repo.github_id, &repo.owner, &repo.name)
                    .await
                    .map_err(|e| Error::Database(e.to_string()))?
                    .id,
            ),
            None => None,
        };

        let size_metric = match normalized.size_metric {
            Some(size) => size,
            None => self.enrich_size(&normalized).await,
        };

        let points = self.policy.points(size_metric);
        let occurred_at = normalized.occurred_at.unwrap_or_else(|| self.clock.now());
        let event_date = occurred_at.date_naive();

        let new_event = db::events::NewEvent {
            external_id: normalized.external_id.clone(),
            user_id: user.id,
            repo_id,
            size_metric,
            points,
            occurred_at,
        };

        // Dedup insert and cap accounting are one transaction: either the
        // event exists with its ordinal and credit applied, or nothing
        // happened.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let Some(event_id) = db::events::insert_if_new(&mut *tx, &new_event)
            .await
            .map_err(|e| Error::Database(e.to_string()))?
        else {
            debug!("Duplicate event {}, ignoring", normalized.external_id);
            return Ok(IngestOutcome {
                accepted: false,
                event: None,
            });
        };

        let ordinal = db::daily::next_ordinal(&mut *tx, user.id, event_date)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        let counted = should_count(ordinal, self.max_daily_counted);

        db::events::finalize(&mut *tx, event_id, ordinal, counted)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        if counted {
            db::daily::record_counted(&mut *tx, user.id, event_date, points)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
            db::users::credit_points(&mut *tx, user.id, points)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        info!(
            "Event {} for {}: {} points, ordinal {}, counted: {}",
            normalized.external_id, user.login, points, ordinal, counted
        );

        if counted {
            // Streak bonus is best-effort: a failure here must not undo
            // the event credit that already committed.
            if let Err(e) = self.advance_streak(user.id).await {
                warn!("Streak update failed for {}: {}", user.login, e);
            }
        }

        let event = db::events::get_by_id(&self.pool, event_id)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(IngestOutcome {
            accepted: true,
            event,
        })
    }

    /// Resolve the author to a User row, creating one on first sight.
    async fn resolve_user(&self, normalized: &NormalizedEvent) -> Result<User, Error> {
        // The payload's own identity is authoritative when it matches
        if let Some(actor) = &normalized.actor {
            return db::users::upsert(
                &self.pool,
                actor.github_id,
                &actor.login,
                actor.avatar_url.as_deref(),
            )
            .await
            .map_err(|e| Error::Database(e.to_string()));
        }

        // Commit author differs from the sender: try the local record,
        // then the API
        if let Some(user) = db::users::get_by_login(&self.pool, &normalized.author_login)
            .await
            .map_err(|e| Error::Database(e.to_string()))?
        {
            return Ok(user);
        }

        let detail = self
            .client
            .get_user(&normalized.author_login)
            .await
            .map_err(|e| Error::GitHub(e.to_string()))?;

        db::users::upsert(
            &self.pool,
            detail.id,
            &detail.login,
            detail.avatar_url.as_deref(),
        )
        .await
        .map_err(|e| Error::Database(e.to_string()))
    }

    /// Look up a commit's diff stats. Failures degrade to size 0 rather
    /// than blocking ingestion.
    async fn enrich_size(&self, normalized: &NormalizedEvent) -> i64 {
        let Some(repo) = &normalized.repo else {
            return 0;
        };

        match self
            .client
            .get_commit(&repo.owner, &repo.name, &normalized.external_id)
            .await
        {
            Ok(detail) => detail.size_metric(),
            Err(e) => {
                warn!(
                    "Size lookup failed for {} ({}/{}), using minimum: {}",
                    normalized.external_id, repo.owner, repo.name, e
                );
                0
            }
        }
    }

    /// Advance the user's streak for today and credit any bonus.
    ///
    /// The day is claimed with a guarded update, so concurrent events for
    /// the same user credit the bonus exactly once.
    async fn advance_streak(&self, user_id: uuid::Uuid) -> Result<(), Error> {
        let Some(user) = db::users::get_by_id(&self.pool, user_id)
            .await
            .map_err(|e| Error::Database(e.to_string()))?
        else {
            return Err(Error::NotFound(format!("user {}", user_id)));
        };

        let state = streak::StreakState {
            current_streak: user.current_streak,
            last_active_date: user.last_active_date,
        };
        let today = self.clock.today();

        let Some(transition) = streak::advance(&state, today) else {
            return Ok(());
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let claimed = db::users::apply_streak(&mut *tx, user_id, transition.new_streak, today)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        if !claimed {
            // Another event won the day between our read and this write
            return Ok(());
        }

        db::streaks::insert_bonus(
            &mut *tx,
            user_id,
            transition.new_streak,
            transition.bonus_points,
            transition.milestone,
        )
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        db::users::credit_points(&mut *tx, user_id, transition.bonus_points)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        info!(
            "Streak for {}: day {} (+{} bonus{})",
            user.login,
            transition.new_streak,
            transition.bonus_points,
            transition
                .milestone
                .map(|m| format!(", {} milestone", m))
                .unwrap_or_default()
        );

        Ok(())
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub(crate) fn client(&self) -> &GitHubClient {
        &self.client
    }
}
