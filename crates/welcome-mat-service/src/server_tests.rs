//! Tests for the HTTP boundary.

use super::*;
use crate::test_support::{mount_token_exchange, test_authenticator, test_client};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use serde_json::json;
use sha2::Sha256;
use tower::ServiceExt;
use welcome_mat_sdk::{Handler, HandlerError};
use wiremock::MockServer;

const SECRET: &str = "it's a secret to everybody";

struct OkHandler;

#[async_trait]
impl Handler for OkHandler {
    async fn handle(&self, _event: &Event, _client: &GitHubClient) -> Result<(), HandlerError> {
        Ok(())
    }
}

struct FailingHandler;

#[async_trait]
impl Handler for FailingHandler {
    async fn handle(&self, _event: &Event, _client: &GitHubClient) -> Result<(), HandlerError> {
        Err(HandlerError::Api(welcome_mat_sdk::ApiError::Timeout))
    }
}

fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

fn app(secret: Option<&str>, router: EventRouter, api: &MockServer) -> Router {
    let state = AppState::new(
        SignatureVerifier::new(secret.map(str::to_string)),
        router,
        test_client(api),
    );
    create_router(state)
}

fn webhook_request(event: &str, delivery: &str, body: &[u8], signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header("x-github-event", event)
        .header("x-github-delivery", delivery);
    if let Some(signature) = signature {
        builder = builder.header("x-hub-signature-256", signature);
    }
    builder.body(Body::from(body.to_vec())).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn home_says_hello() {
    let api = MockServer::start().await;
    let app = app(Some(SECRET), EventRouter::new(), &api);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Hello world");
}

#[tokio::test]
async fn ping_is_acknowledged_without_dispatch() {
    let api = MockServer::start().await;
    // A handler registered for ping must NOT run.
    let mut router = EventRouter::new();
    router.register("ping", None, Arc::new(FailingHandler));
    let app = app(Some(SECRET), router, &api);

    let body = serde_json::to_vec(&json!({ "zen": "Keep it logically awesome." })).unwrap();
    let signature = sign(SECRET, &body);
    let response = app
        .oneshot(webhook_request("ping", "d-ping", &body, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_signature_is_rejected_before_any_outbound_call() {
    let api = MockServer::start().await;
    let mut router = EventRouter::new();
    router.register("issue_comment", Some("created"), Arc::new(OkHandler));
    let app = app(Some(SECRET), router, &api);

    let body = serde_json::to_vec(&json!({ "action": "created" })).unwrap();
    let signature = sign("wrong secret", &body);
    let response = app
        .oneshot(webhook_request(
            "issue_comment",
            "d-1",
            &body,
            Some(&signature),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(api.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_signature_is_rejected_when_secret_is_configured() {
    let api = MockServer::start().await;
    let app = app(Some(SECRET), EventRouter::new(), &api);

    let body = serde_json::to_vec(&json!({})).unwrap();
    let response = app
        .oneshot(webhook_request("ping", "d-2", &body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unsigned_delivery_is_accepted_without_a_secret() {
    let api = MockServer::start().await;
    let app = app(None, EventRouter::new(), &api);

    let body = serde_json::to_vec(&json!({ "zen": "Anything added dilutes everything else." }))
        .unwrap();
    let response = app
        .oneshot(webhook_request("ping", "d-3", &body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_event_header_is_a_bad_request() {
    let api = MockServer::start().await;
    let app = app(Some(SECRET), EventRouter::new(), &api);

    let body = serde_json::to_vec(&json!({})).unwrap();
    let signature = sign(SECRET, &body);
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("x-hub-signature-256", &signature)
        // No x-github-event / x-github-delivery headers.
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_json_body_is_a_bad_request() {
    let api = MockServer::start().await;
    let app = app(Some(SECRET), EventRouter::new(), &api);

    let body = b"not json at all";
    let signature = sign(SECRET, body);
    let response = app
        .oneshot(webhook_request("push", "d-4", body, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unrouted_event_is_still_a_success() {
    let api = MockServer::start().await;
    let app = app(Some(SECRET), EventRouter::new(), &api);

    let body = serde_json::to_vec(&json!({ "action": "deleted" })).unwrap();
    let signature = sign(SECRET, &body);
    let response = app
        .oneshot(webhook_request("label", "d-5", &body, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn handler_failure_maps_to_a_generic_500() {
    let api = MockServer::start().await;
    let mut router = EventRouter::new();
    router.register("push", None, Arc::new(FailingHandler));
    let app = app(Some(SECRET), router, &api);

    let body = serde_json::to_vec(&json!({ "ref": "refs/heads/main" })).unwrap();
    let signature = sign(SECRET, &body);
    let response = app
        .oneshot(webhook_request("push", "d-6", &body, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // The response stays generic; failure detail goes to the logs.
    assert_eq!(body_text(response).await, "event processing failed");
}

#[tokio::test]
async fn full_pipeline_reaches_the_mock_api() {
    let api = MockServer::start().await;
    mount_token_exchange(&api, 42).await;

    let comment_url = format!("{}/repos/o/r/issues/comments/5", api.uri());
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/repos/o/r/issues/comments/5/reactions"))
        .respond_with(wiremock::ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&api)
        .await;

    let mut router = EventRouter::new();
    router.register(
        "issue_comment",
        Some("created"),
        Arc::new(crate::handlers::SelfCommentReactionHandler::new(
            test_authenticator(),
            "welcome-mat[bot]",
        )),
    );
    let app = app(Some(SECRET), router, &api);

    let body = serde_json::to_vec(&json!({
        "action": "created",
        "installation": { "id": 42 },
        "sender": { "login": "welcome-mat[bot]" },
        "comment": { "url": comment_url },
    }))
    .unwrap();
    let signature = sign(SECRET, &body);
    let response = app
        .oneshot(webhook_request("issue_comment", "d-7", &body, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
