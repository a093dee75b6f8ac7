//! Webhook payload parsing

use crate::events::PushWebhookEvent;
use serde_json::Value;
use tracing::{debug, warn};

/// Parsed webhook payload
#[derive(Debug)]
pub enum WebhookPayload {
    Push(PushWebhookEvent),
    Ping { zen: String },
    Unknown { event_type: String },
}

impl WebhookPayload {
    /// Parse a webhook payload from the event type and raw body
    pub fn parse(event_type: &str, body: &[u8]) -> Result<Self, serde_json::Error> {
        debug!("Parsing webhook: {}", event_type);

        match event_type {
            "ping" => {
                let v: Value = serde_json::from_slice(body)?;
                let zen = v["zen"].as_str().unwrap_or("").to_string();
                Ok(WebhookPayload::Ping { zen })
            }
            "push" => {
                let event: PushWebhookEvent = serde_json::from_slice(body)?;
                Ok(WebhookPayload::Push(event))
            }
            _ => {
                warn!("Ignoring webhook event type: {}", event_type);
                Ok(WebhookPayload::Unknown {
                    event_type: event_type.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUSH_BODY: &str = r#"{
        "ref": "refs/heads/main",
        "repository": {"id": 42, "name": "demo", "full_name": "octo/demo"},
        "sender": {"id": 7, "login": "octocat", "avatar_url": null},
        "commits": [
            {"id": "abc123", "message": "fix", "timestamp": "2026-01-05T10:00:00Z",
             "author": {"name": "Octo Cat", "email": "o@c.at", "username": "octocat"}}
        ]
    }"#;

    #[test]
    fn test_parse_push() {
        let payload = WebhookPayload::parse("push", PUSH_BODY.as_bytes()).unwrap();
        match payload {
            WebhookPayload::Push(event) => {
                assert_eq!(event.repository.full_name, "octo/demo");
                assert_eq!(event.commits.len(), 1);
                assert_eq!(event.commits[0].id, "abc123");
                assert_eq!(
                    event.commits[0].author.as_ref().unwrap().username.as_deref(),
                    Some("octocat")
                );
            }
            other => panic!("expected Push, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ping() {
        let body = br#"{"zen": "Design for failure."}"#;
        match WebhookPayload::parse("ping", body).unwrap() {
            WebhookPayload::Ping { zen } => assert_eq!(zen, "Design for failure."),
            other => panic!("expected Ping, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_is_acknowledged() {
        match WebhookPayload::parse("issues", b"{}").unwrap() {
            WebhookPayload::Unknown { event_type } => assert_eq!(event_type, "issues"),
            other => panic!("expected Unknown, got {:?}", other),
        }
    }
}
