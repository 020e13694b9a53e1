//! Tests for typed payload projections.

use super::*;
use serde_json::json;

fn event_with(payload: Value) -> Event {
    Event::new("test", Some("created".to_string()), "d1", payload)
}

mod installation_created {
    use super::*;

    #[test]
    fn extracts_sender_and_repositories() {
        let event = event_with(json!({
            "sender": {"login": "alice"},
            "repositories": [
                {"full_name": "o/r"},
                {"full_name": "o/other"}
            ]
        }));

        let projection = InstallationCreatedPayload::from_event(&event).unwrap();
        assert_eq!(projection.sender_login, "alice");
        assert_eq!(projection.repositories, vec!["o/r", "o/other"]);
    }

    #[test]
    fn empty_repository_list_is_valid() {
        let event = event_with(json!({
            "sender": {"login": "alice"},
            "repositories": []
        }));

        let projection = InstallationCreatedPayload::from_event(&event).unwrap();
        assert!(projection.repositories.is_empty());
    }

    #[test]
    fn missing_repositories_fails_with_path() {
        let event = event_with(json!({"sender": {"login": "alice"}}));

        let result = InstallationCreatedPayload::from_event(&event);
        assert!(
            matches!(result, Err(EventError::MissingField { ref field }) if field == "repositories")
        );
    }

    #[test]
    fn repository_without_full_name_fails_with_index() {
        let event = event_with(json!({
            "sender": {"login": "alice"},
            "repositories": [{"full_name": "o/r"}, {"name": "bare"}]
        }));

        let result = InstallationCreatedPayload::from_event(&event);
        assert!(
            matches!(result, Err(EventError::MissingField { ref field })
                if field == "repositories[1].full_name")
        );
    }
}

mod pull_request_opened {
    use super::*;

    #[test]
    fn extracts_all_fields() {
        let event = event_with(json!({
            "sender": {"login": "bob"},
            "pull_request": {
                "issue_url": "https://api.github.com/repos/o/r/issues/5",
                "author_association": "MEMBER"
            }
        }));

        let projection = PullRequestOpenedPayload::from_event(&event).unwrap();
        assert_eq!(projection.sender_login, "bob");
        assert_eq!(
            projection.issue_url,
            "https://api.github.com/repos/o/r/issues/5"
        );
        assert_eq!(projection.author_association, "MEMBER");
    }

    #[test]
    fn missing_issue_url_fails_with_path() {
        let event = event_with(json!({
            "sender": {"login": "bob"},
            "pull_request": {"author_association": "NONE"}
        }));

        let result = PullRequestOpenedPayload::from_event(&event);
        assert!(
            matches!(result, Err(EventError::MissingField { ref field })
                if field == "pull_request.issue_url")
        );
    }
}

mod issue_comment_created {
    use super::*;

    #[test]
    fn extracts_sender_and_comment_url() {
        let event = event_with(json!({
            "sender": {"login": "welcome-mat[bot]"},
            "comment": {"url": "https://api.github.com/repos/o/r/issues/comments/9"}
        }));

        let projection = IssueCommentCreatedPayload::from_event(&event).unwrap();
        assert_eq!(projection.sender_login, "welcome-mat[bot]");
        assert_eq!(
            projection.comment_url,
            "https://api.github.com/repos/o/r/issues/comments/9"
        );
    }

    #[test]
    fn missing_comment_url_fails() {
        let event = event_with(json!({"sender": {"login": "carol"}}));

        let result = IssueCommentCreatedPayload::from_event(&event);
        assert!(
            matches!(result, Err(EventError::MissingField { ref field }) if field == "comment.url")
        );
    }
}
