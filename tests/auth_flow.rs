//! Auth flow tests against a mock portal backend.

use amino_portal::auth::{AccessRequestStatus, MemoryTokenStore};
use amino_portal::{LoginCredentials, PortalClient, RetryConfig, SignupRequest, TokenStore};
use std::sync::Arc;
use std::time::Duration;

fn client_for(server: &mockito::ServerGuard, tokens: Arc<MemoryTokenStore>) -> PortalClient {
    PortalClient::builder()
        .base_url(server.url())
        .retry(RetryConfig::new().with_base_delay(Duration::from_millis(1)))
        .token_store(tokens)
        .build()
        .expect("client should build")
}

#[tokio::test]
async fn successful_login_stores_the_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "success": true,
                "token": "head.payload.sig",
                "user": {"_id": "u1", "email": "a@b.c", "isApproved": true}
            }"#,
        )
        .expect(1)
        .create_async()
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, tokens.clone());

    let response = client
        .auth()
        .login(&LoginCredentials::new("a@b.c", "secret"))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(tokens.token().as_deref(), Some("head.payload.sig"));
    assert!(client.auth().is_authenticated());
    mock.assert_async().await;
}

#[tokio::test]
async fn login_with_bad_credentials_is_a_friendly_failure() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"success": false}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let response = client
        .auth()
        .login(&LoginCredentials::new("a@b.c", "wrong"))
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(
        response.message.as_deref(),
        Some("Invalid credentials. Please try again.")
    );
    assert!(!client.auth().is_authenticated());
    mock.assert_async().await;
}

#[tokio::test]
async fn rate_limited_login_fails_fast_without_retry() {
    let mut server = mockito::Server::new_async().await;
    // expect(1) is the point: a 429 on a credential submission must not be
    // replayed through the backoff schedule.
    let mock = server
        .mock("POST", "/auth/login")
        .with_status(429)
        .with_body(r#"{"message": "rate limited"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let response = client
        .auth()
        .login(&LoginCredentials::new("a@b.c", "secret"))
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(
        response.message.as_deref(),
        Some("Too many login attempts. Please try again later.")
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn rate_limited_signup_fails_fast_without_retry() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/signup-request")
        .with_status(429)
        .with_body(r#"{"message": "rate limited"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let response = client
        .auth()
        .signup_request(&SignupRequest {
            email: "a@b.c".into(),
            reason: "archival research".into(),
        })
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(
        response.message.as_deref(),
        Some("Too many signup attempts. Please try again later.")
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_token_in_login_response_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(r#"{"success": true, "token": "not-a-jwt"}"#)
        .create_async()
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, tokens.clone());

    let response = client
        .auth()
        .login(&LoginCredentials::new("a@b.c", "secret"))
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(tokens.token(), None);
}

#[tokio::test]
async fn duplicate_signup_maps_to_a_conflict_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/signup-request")
        .with_status(409)
        .with_body(r#"{"success": false}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let response = client
        .auth()
        .signup_request(&SignupRequest {
            email: "a@b.c".into(),
            reason: "archival research".into(),
        })
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(
        response.message.as_deref(),
        Some("An account with this email already exists.")
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn access_requests_are_decoded_and_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/auth/requests")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "success": true,
                "requests": [{
                    "id": "r1",
                    "email": "a@b.c",
                    "reason": "archival research",
                    "status": "pending",
                    "createdAt": "2025-03-01T00:00:00Z",
                    "updatedAt": "2025-03-02T00:00:00Z"
                }]
            }"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::with_token("h.p.s")));
    let first = client.auth().access_requests().await.unwrap();
    let second = client.auth().access_requests().await.unwrap();

    assert_eq!(first.requests.len(), 1);
    assert_eq!(first.requests[0].status, AccessRequestStatus::Pending);
    assert_eq!(second.requests.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn generate_passwords_round_trips() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/generate-passwords")
        .with_status(200)
        .with_body(
            r#"{
                "success": true,
                "message": "2 passwords generated",
                "results": [
                    {"email": "a@b.c", "password": "p1"},
                    {"email": "d@e.f", "password": "p2"}
                ]
            }"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::with_token("h.p.s")));
    let response = client
        .auth()
        .generate_passwords(vec!["a@b.c".into(), "d@e.f".into()])
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.results.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn logout_clears_token_and_cache() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/auth/requests")
        .with_status(200)
        .with_body(r#"{"success": true, "requests": []}"#)
        .expect(2)
        .create_async()
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("h.p.s"));
    let client = client_for(&server, tokens.clone());

    client.auth().access_requests().await.unwrap();
    client.auth().logout().await;
    assert_eq!(tokens.token(), None);

    // Cache was dropped with the session, so this dials out again.
    client.auth().access_requests().await.unwrap();
    mock.assert_async().await;
}
