//! GitHub integration: webhook verification and parsing, REST client

pub mod client;
pub mod events;
pub mod verify;
pub mod webhooks;

pub use client::{ClientError, EventsPage, GitHubClient};
pub use events::*;
pub use verify::{sign_body, verify_signature};
pub use webhooks::WebhookPayload;
