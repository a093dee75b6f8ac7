//! Application state

use std::sync::Arc;

use common::{Clock, Config};
use github::GitHubClient;
use processor::EventIngestor;
use sqlx::PgPool;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub clock: Arc<dyn Clock>,
    pub ingestor: Arc<EventIngestor>,
    pub github: GitHubClient,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        let ingestor = Arc::new(EventIngestor::new(pool.clone(), &config, clock.clone()));
        let github = GitHubClient::new(config.github_token.clone());
        Self {
            config,
            pool,
            clock,
            ingestor,
            github,
        }
    }
}
