//! GitHub event types
//!
//! Two externally-shaped families: push webhook payloads (delivered to us)
//! and the `/repos/{owner}/{repo}/events` poll API (fetched by us). Both
//! are normalized into canonical events at the ingestion boundary; optional
//! fields stop here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub user (as appears in webhook payloads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
    pub avatar_url: Option<String>,
}

/// GitHub repository (as appears in webhook payloads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
}

/// Commit author as embedded in a push payload. `username` is the GitHub
/// login and may be absent for commits authored outside GitHub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushCommitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

/// One commit inside a push webhook payload.
///
/// Push payloads carry no diff stats; the size metric is enriched via a
/// follow-up commit lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushCommit {
    /// Commit SHA
    pub id: String,
    pub message: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub author: Option<PushCommitAuthor>,
}

/// Push event webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushWebhookEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: GitHubRepo,
    pub sender: GitHubUser,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

/// One item from the `/repos/{owner}/{repo}/events` poll API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollEvent {
    /// Event id, unique per event
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub actor: GitHubUser,
    pub payload: PollPushPayload,
    pub created_at: DateTime<Utc>,
}

/// Payload of a PushEvent from the poll API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollPushPayload {
    pub push_id: Option<i64>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    /// Number of commits in the push
    #[serde(default)]
    pub size: i64,
    /// Head SHA
    pub head: Option<String>,
}
