#[cfg(test)]
mod tests {
    use crate::handler::{NormalizedEvent, RepoRef};
    use github::events::{PollEvent, PushWebhookEvent};

    fn push_event(sender_login: &str, author_username: Option<&str>) -> PushWebhookEvent {
        let author = match author_username {
            Some(login) => format!(
                r#"{{"name": "Dev", "email": "dev@example.com", "username": "{}"}}"#,
                login
            ),
            None => r#"{"name": "Dev", "email": "dev@example.com", "username": null}"#.to_string(),
        };
        let body = format!(
            r#"{{
                "ref": "refs/heads/main",
                "repository": {{"id": 99, "name": "demo", "full_name": "octo/demo"}},
                "sender": {{"id": 7, "login": "{}", "avatar_url": null}},
                "commits": [
                    {{"id": "sha-1", "message": "m", "timestamp": "2026-01-05T10:00:00Z",
                      "author": {}}}
                ]
            }}"#,
            sender_login, author
        );
        serde_json::from_str(&body).unwrap()
    }

    #[test]
    fn test_push_commit_normalizes_author_and_repo() {
        let event = push_event("octocat", Some("octocat"));
        let normalized = NormalizedEvent::from_push_commit(&event, &event.commits[0]).unwrap();

        assert_eq!(normalized.external_id, "sha-1");
        assert_eq!(normalized.author_login, "octocat");
        // Sender matches the author, so the payload identity is usable
        let actor = normalized.actor.unwrap();
        assert_eq!(actor.github_id, 7);

        let repo = normalized.repo.unwrap();
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.name, "demo");
        assert_eq!(repo.github_id, 99);

        // Push payloads never carry a size; enrichment fills it in later
        assert_eq!(normalized.size_metric, None);
    }

    #[test]
    fn test_push_commit_by_other_author_has_no_actor() {
        let event = push_event("someone-else", Some("octocat"));
        let normalized = NormalizedEvent::from_push_commit(&event, &event.commits[0]).unwrap();

        assert_eq!(normalized.author_login, "octocat");
        assert!(normalized.actor.is_none());
    }

    #[test]
    fn test_push_commit_without_github_login_is_rejected() {
        let event = push_event("octocat", None);
        assert!(NormalizedEvent::from_push_commit(&event, &event.commits[0]).is_none());
    }

    #[test]
    fn test_poll_event_normalizes_size_from_commit_count() {
        let body = r#"{
            "id": "31415926535",
            "type": "PushEvent",
            "actor": {"id": 7, "login": "octocat", "avatar_url": null},
            "payload": {"push_id": 123, "ref": "refs/heads/main", "size": 3, "head": "abc"},
            "created_at": "2026-01-05T10:00:00Z"
        }"#;
        let event: PollEvent = serde_json::from_str(body).unwrap();

        let repo = RepoRef {
            github_id: 99,
            owner: "octo".to_string(),
            name: "demo".to_string(),
        };
        let normalized = NormalizedEvent::from_poll_event(&event, Some(repo));

        assert_eq!(normalized.external_id, "31415926535");
        assert_eq!(normalized.size_metric, Some(3));
        assert_eq!(normalized.author_login, "octocat");
        assert!(normalized.actor.is_some());
        assert!(normalized.occurred_at.is_some());
    }
}
