//! GitHub REST API client
//!
//! Two jobs: enrich commits with diff stats (push webhooks carry none) and
//! poll repository events with conditional requests so unchanged feeds cost
//! no quota.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, IF_NONE_MATCH, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::events::PollEvent;

const GITHUB_API: &str = "https://api.github.com";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// GitHub API client
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
}

/// Commit as returned by `GET /repos/{owner}/{repo}/commits/{sha}`
#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    pub sha: String,
    pub stats: Option<CommitStats>,
}

#[derive(Debug, Deserialize)]
pub struct CommitStats {
    pub additions: i64,
    pub deletions: i64,
    pub total: i64,
}

impl CommitDetail {
    /// Lines changed (additions + deletions), 0 when stats are absent
    pub fn size_metric(&self) -> i64 {
        self.stats
            .as_ref()
            .map(|s| s.additions + s.deletions)
            .unwrap_or(0)
    }
}

/// A page of polled events plus the caching state to persist for the
/// next conditional request
#[derive(Debug)]
pub struct EventsPage {
    pub events: Vec<PollEvent>,
    pub etag: Option<String>,
    pub poll_interval_secs: i32,
}

/// Follower/following entry (login is all we need for the mutual closure)
#[derive(Debug, Deserialize)]
pub struct FollowUser {
    pub login: String,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, token }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("gitsummit/0.1"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(ref token) = self.token {
            if let Ok(val) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, val);
            }
        }
        headers
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(resp.url().to_string()));
        }
        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ClientError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, ClientError> {
        debug!("GET {}", url);
        let resp = self.client.get(url).headers(self.headers()).send().await?;
        let resp = Self::check_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// Fetch one commit's details, including diff stats
    pub async fn get_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<CommitDetail, ClientError> {
        let url = format!("{}/repos/{}/{}/commits/{}", GITHUB_API, owner, repo, sha);
        self.get(&url).await
    }

    /// Poll a repository's event feed with a conditional request.
    ///
    /// `Ok(None)` means 304 Not Modified: nothing new, keep the stored tag.
    /// On 2xx the result carries only `PushEvent` items plus the new ETag
    /// and the server's recommended poll interval.
    pub async fn poll_repo_events(
        &self,
        owner: &str,
        repo: &str,
        last_etag: Option<&str>,
    ) -> Result<Option<EventsPage>, ClientError> {
        let url = format!("{}/repos/{}/{}/events?per_page=100", GITHUB_API, owner, repo);
        debug!("GET {} (etag: {:?})", url, last_etag);

        let mut headers = self.headers();
        if let Some(etag) = last_etag {
            if let Ok(val) = HeaderValue::from_str(etag) {
                headers.insert(IF_NONE_MATCH, val);
            }
        }

        let resp = self.client.get(&url).headers(headers).send().await?;

        if resp.status() == reqwest::StatusCode::NOT_MODIFIED {
            return Ok(None);
        }

        let resp = Self::check_status(resp).await?;

        let etag = resp
            .headers()
            .get("etag")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let poll_interval_secs = resp
            .headers()
            .get("x-poll-interval")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        // Non-push events carry differently shaped payloads, so filter on
        // the raw values before deserializing into PollEvent.
        let raw: Vec<serde_json::Value> = resp.json().await?;
        let events = raw
            .into_iter()
            .filter(|v| v["type"].as_str() == Some("PushEvent"))
            .filter_map(|v| serde_json::from_value::<PollEvent>(v).ok())
            .collect();

        Ok(Some(EventsPage {
            events,
            etag,
            poll_interval_secs,
        }))
    }

    /// Fetch the mutual-follow closure for a user: accounts that appear in
    /// both their followers and their following lists.
    pub async fn fetch_mutual_followers(&self, login: &str) -> Result<Vec<String>, ClientError> {
        let followers: Vec<FollowUser> = self
            .get(&format!(
                "{}/users/{}/followers?per_page=100",
                GITHUB_API, login
            ))
            .await?;
        let following: Vec<FollowUser> = self
            .get(&format!(
                "{}/users/{}/following?per_page=100",
                GITHUB_API, login
            ))
            .await?;

        let follower_logins: std::collections::HashSet<String> =
            followers.into_iter().map(|f| f.login).collect();

        Ok(following
            .into_iter()
            .map(|f| f.login)
            .filter(|login| follower_logins.contains(login))
            .collect())
    }

    /// Fetch a user's public profile
    pub async fn get_user(&self, login: &str) -> Result<GithubUserDetail, ClientError> {
        let url = format!("{}/users/{}", GITHUB_API, login);
        self.get(&url).await
    }

    /// Fetch repository info
    pub async fn get_repo(&self, owner: &str, name: &str) -> Result<RepoDetail, ClientError> {
        let url = format!("{}/repos/{}/{}", GITHUB_API, owner, name);
        self.get(&url).await
    }
}

/// Repository as returned by `GET /repos/{owner}/{repo}`
#[derive(Debug, Deserialize)]
pub struct RepoDetail {
    pub id: i64,
    pub name: String,
    pub full_name: String,
}

/// User as returned by `GET /users/{login}`
#[derive(Debug, Deserialize)]
pub struct GithubUserDetail {
    pub id: i64,
    pub login: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_size_metric_sums_changes() {
        let detail = CommitDetail {
            sha: "abc".to_string(),
            stats: Some(CommitStats {
                additions: 12,
                deletions: 3,
                total: 15,
            }),
        };
        assert_eq!(detail.size_metric(), 15);
    }

    #[test]
    fn test_commit_size_metric_defaults_to_zero() {
        let detail = CommitDetail {
            sha: "abc".to_string(),
            stats: None,
        };
        assert_eq!(detail.size_metric(), 0);
    }
}
