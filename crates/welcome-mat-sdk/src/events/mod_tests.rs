//! Tests for event decoding.

use super::*;
use serde_json::json;

fn webhook_headers(event: &str, delivery: &str) -> HashMap<String, String> {
    HashMap::from([
        (EVENT_HEADER.to_string(), event.to_string()),
        (DELIVERY_HEADER.to_string(), delivery.to_string()),
    ])
}

#[test]
fn decodes_event_with_action() {
    let headers = webhook_headers("pull_request", "delivery-123");
    let body = br#"{"action":"opened","number":7}"#;

    let event = Event::from_http(&headers, body).unwrap();

    assert_eq!(event.name(), "pull_request");
    assert_eq!(event.action(), Some("opened"));
    assert_eq!(event.delivery_id(), "delivery-123");
    assert_eq!(event.payload()["number"], json!(7));
}

#[test]
fn action_is_absent_when_payload_has_none() {
    let headers = webhook_headers("ping", "delivery-ping");
    let body = br#"{"zen":"Design for failure.","hook_id":1}"#;

    let event = Event::from_http(&headers, body).unwrap();

    assert_eq!(event.action(), None);
    assert!(event.is_ping());
}

#[test]
fn header_lookup_is_case_insensitive() {
    let headers = HashMap::from([
        ("X-GitHub-Event".to_string(), "issues".to_string()),
        ("X-GitHub-Delivery".to_string(), "abc".to_string()),
    ]);

    let event = Event::from_http(&headers, b"{}").unwrap();
    assert_eq!(event.name(), "issues");
    assert_eq!(event.delivery_id(), "abc");
}

#[test]
fn missing_event_header_fails() {
    let headers = HashMap::from([(DELIVERY_HEADER.to_string(), "abc".to_string())]);

    let result = Event::from_http(&headers, b"{}");
    assert!(
        matches!(result, Err(EventError::MissingHeader { ref header }) if header == EVENT_HEADER)
    );
}

#[test]
fn missing_delivery_header_fails() {
    let headers = HashMap::from([(EVENT_HEADER.to_string(), "issues".to_string())]);

    let result = Event::from_http(&headers, b"{}");
    assert!(matches!(result, Err(EventError::MissingHeader { .. })));
}

#[test]
fn invalid_json_body_fails() {
    let headers = webhook_headers("issues", "abc");

    let result = Event::from_http(&headers, b"{not json");
    assert!(matches!(result, Err(EventError::InvalidJson(_))));
}

#[test]
fn installation_id_is_extracted() {
    let event = Event::new(
        "issues",
        Some("opened".to_string()),
        "d1",
        json!({"installation": {"id": 42}}),
    );

    assert_eq!(event.installation_id().unwrap().as_u64(), 42);
}

#[test]
fn missing_installation_id_fails() {
    let event = Event::new("issues", None, "d1", json!({}));

    let result = event.installation_id();
    assert!(
        matches!(result, Err(EventError::MissingField { ref field }) if field == "installation.id")
    );
}

#[test]
fn str_field_walks_dotted_paths() {
    let payload = json!({"sender": {"login": "alice"}});
    assert_eq!(str_field(&payload, "sender.login").unwrap(), "alice");

    let missing = str_field(&payload, "sender.name");
    assert!(matches!(missing, Err(EventError::MissingField { ref field }) if field == "sender.name"));

    // Wrong type counts as missing too.
    let wrong_type_payload = json!({"sender": {"login": 5}});
    let wrong_type = str_field(&wrong_type_payload, "sender.login");
    assert!(wrong_type.is_err());
}
