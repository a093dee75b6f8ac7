//! Background poll sync service
//!
//! Pull-based counterpart to the webhook: polls each linked repository's
//! event feed on an interval, ingesting any pushes the webhook path never
//! saw. Conditional requests keep unchanged feeds free.

use std::sync::Arc;
use std::time::Duration;

use github::ClientError;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::handler::{EventIngestor, NormalizedEvent, RepoRef};

/// Configuration for the sync service
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Interval between sync runs
    pub interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15 * 60),
        }
    }
}

/// Stats for one repo's poll
#[derive(Debug, Default)]
pub struct PollStats {
    pub new_events: usize,
    pub duplicates: usize,
    pub not_modified: bool,
}

/// Background service that periodically polls all linked repos
pub struct SyncService {
    ingestor: Arc<EventIngestor>,
    config: SyncConfig,
}

impl SyncService {
    pub fn new(ingestor: Arc<EventIngestor>, config: SyncConfig) -> Self {
        Self { ingestor, config }
    }

    /// Start the poll loop
    pub async fn run(self) {
        info!(
            "Starting sync service (interval: {:?})",
            self.config.interval
        );

        let mut ticker = interval(self.config.interval);

        // Skip the first immediate tick - let the server start up first
        ticker.tick().await;

        loop {
            ticker.tick().await;
            info!("Starting scheduled poll of all linked repos");

            if let Err(e) = self.sync_all().await {
                error!("Sync failed: {}", e);
            }
        }
    }

    /// Poll every linked repository once. Per-repo failures are isolated;
    /// one broken repo must not stop the sweep.
    pub async fn sync_all(&self) -> Result<SyncSummary, common::Error> {
        let repos = db::repos::list(self.ingestor.pool())
            .await
            .map_err(|e| common::Error::Database(e.to_string()))?;

        if repos.is_empty() {
            info!("No linked repos to poll");
            return Ok(SyncSummary::default());
        }

        info!("Polling {} linked repos", repos.len());
        let mut summary = SyncSummary::default();

        for repo in repos {
            match poll_repo(&self.ingestor, &repo).await {
                Ok(stats) => {
                    if stats.new_events > 0 {
                        info!(
                            "{}: {} new pushes ({} duplicates)",
                            repo.full_name(),
                            stats.new_events,
                            stats.duplicates
                        );
                    }
                    summary.new_events += stats.new_events;
                    summary.repos_polled += 1;
                }
                Err(ClientError::RateLimited { retry_after }) => {
                    warn!(
                        "Rate limited while polling {}. Pausing for {} seconds",
                        repo.full_name(),
                        retry_after
                    );
                    tokio::time::sleep(Duration::from_secs(retry_after)).await;
                    summary.repos_failed += 1;
                }
                Err(e) => {
                    error!("Failed to poll {}: {}", repo.full_name(), e);
                    summary.repos_failed += 1;
                    // Continue with other repos
                }
            }

            // Small delay between repos to be nice to GitHub
            tokio::time::sleep(Duration::from_secs(2)).await;
        }

        info!(
            "Poll sweep complete: {} repos, {} new events, {} failed",
            summary.repos_polled, summary.new_events, summary.repos_failed
        );
        Ok(summary)
    }
}

/// Totals over one full sweep
#[derive(Debug, Default, serde::Serialize)]
pub struct SyncSummary {
    pub repos_polled: usize,
    pub repos_failed: usize,
    pub new_events: usize,
}

/// Poll one repository's feed and ingest fresh pushes.
async fn poll_repo(
    ingestor: &EventIngestor,
    repo: &common::models::Repository,
) -> Result<PollStats, ClientError> {
    let page = ingestor
        .client()
        .poll_repo_events(&repo.owner, &repo.name, repo.last_etag.as_deref())
        .await?;

    let Some(page) = page else {
        // 304: nothing changed since the stored entity tag
        if let Err(e) = db::repos::touch_polled(ingestor.pool(), repo.id).await {
            warn!("Failed to record poll time for {}: {}", repo.full_name(), e);
        }
        return Ok(PollStats {
            not_modified: true,
            ..Default::default()
        });
    };

    let mut stats = PollStats::default();

    for event in &page.events {
        let repo_ref = RepoRef {
            github_id: repo.github_id,
            owner: repo.owner.clone(),
            name: repo.name.clone(),
        };
        let normalized = NormalizedEvent::from_poll_event(event, Some(repo_ref));

        match ingestor.ingest(normalized).await {
            Ok(outcome) if outcome.accepted => stats.new_events += 1,
            Ok(_) => stats.duplicates += 1,
            Err(e) => warn!("Failed to ingest polled event {}: {}", event.id, e),
        }
    }

    if let Err(e) = db::repos::update_poll_state(
        ingestor.pool(),
        repo.id,
        page.etag.as_deref(),
        page.poll_interval_secs,
    )
    .await
    {
        warn!("Failed to store poll state for {}: {}", repo.full_name(), e);
    }

    Ok(stats)
}
