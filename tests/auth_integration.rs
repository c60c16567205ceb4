//! Integration tests for login and token refresh against a mock auth endpoint.

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use exporter_core::transport::build_http_client;
use exporter_core::{AuthError, Authenticator, Credentials, HttpSettings, TokenSource};
use serde_json::json;
use support::provider::Provider;
use support::socket_guard::start_mock_server_or_skip;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, Request, Respond, ResponseTemplate};

/// Issues `tok-1`, `tok-2`, ... on successive logins.
struct CountingLogin(AtomicUsize);

impl Respond for CountingLogin {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200).set_body_json(json!({"data": {"access": format!("tok-{n}")}}))
    }
}

fn authenticator(provider: &Provider) -> Authenticator {
    let client = build_http_client(HttpSettings::default()).unwrap();
    Authenticator::new(
        client,
        &provider.endpoints(),
        Credentials::new("me@example.com", "hunter2"),
    )
}

#[tokio::test]
async fn test_login_posts_credentials_and_stores_bearer_token() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let provider = Provider::new(server);
    Mock::given(method("POST"))
        .and(path("/auth-v1/users/tokens"))
        .and(body_json(json!({"username": "me@example.com", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"access": "tok"}})))
        .expect(1)
        .mount(&provider.server)
        .await;

    let auth = authenticator(&provider);
    assert!(auth.current_token().await.is_none());

    let token = auth.authenticate().await.unwrap();
    assert_eq!(token.header_value(), "Bearer tok");
    assert_eq!(auth.current_token().await, Some(token));
}

#[tokio::test]
async fn test_login_rejection_carries_status_and_message() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let provider = Provider::new(server);
    Mock::given(method("POST"))
        .and(path("/auth-v1/users/tokens"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&provider.server)
        .await;

    let err = authenticator(&provider).authenticate().await.unwrap_err();
    match &err {
        AuthError::Rejected { status, message } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_login_without_access_field_is_malformed() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let provider = Provider::new(server);
    Mock::given(method("POST"))
        .and(path("/auth-v1/users/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&provider.server)
        .await;

    let err = authenticator(&provider).authenticate().await.unwrap_err();
    assert!(matches!(err, AuthError::MalformedResponse { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_concurrent_refreshes_of_the_same_token_log_in_once() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let provider = Provider::new(server);
    Mock::given(method("POST"))
        .and(path("/auth-v1/users/tokens"))
        .respond_with(CountingLogin(AtomicUsize::new(0)))
        .expect(2)
        .mount(&provider.server)
        .await;

    let auth = Arc::new(authenticator(&provider));
    let stale = auth.authenticate().await.unwrap();
    assert_eq!(stale.header_value(), "Bearer tok-1");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let auth = Arc::clone(&auth);
            let stale = stale.clone();
            tokio::spawn(async move { auth.reauthenticate(Some(&stale)).await })
        })
        .collect();
    for handle in handles {
        let fresh = handle.await.unwrap().unwrap();
        assert_eq!(fresh.header_value(), "Bearer tok-2");
    }
    assert_eq!(
        auth.current_token().await.unwrap().header_value(),
        "Bearer tok-2"
    );
}
