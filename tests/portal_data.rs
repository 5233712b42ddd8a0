//! Portal content surface tests against a mock backend.

use amino_portal::auth::MemoryTokenStore;
use amino_portal::{Error, PortalClient, RetryConfig};
use std::sync::Arc;
use std::time::Duration;

const OUTPUT_INFO: &str = r#"{
    "success": true,
    "data": {
        "t1": {
            "threadId": "t1",
            "title": "Morning show",
            "ndcId": 1,
            "iconUrl": null,
            "sid_info": [
                {"sid": "s1", "createdT": "2025-01-10T08:00:00Z", "files": []}
            ]
        },
        "t2": {
            "threadId": "t2",
            "title": "Night sessions",
            "ndcId": 2,
            "iconUrl": "https://cdn.example.com/t2.png",
            "sid_info": [
                {"sid": "s2", "createdT": "2025-02-01T08:00:00Z", "files": []},
                {"sid": "s3", "createdT": "2025-03-15T08:00:00Z", "files": []}
            ]
        }
    }
}"#;

fn client_for(server: &mockito::ServerGuard) -> PortalClient {
    PortalClient::builder()
        .base_url(server.url())
        .retry(RetryConfig::new().with_base_delay(Duration::from_millis(1)))
        .token_store(Arc::new(MemoryTokenStore::with_token("h.p.s")))
        .build()
        .expect("client should build")
}

#[tokio::test]
async fn groups_are_sorted_by_newest_recording() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/output-info")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(OUTPUT_INFO)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let groups = client.groups().await.unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].thread_id, "t2");
    assert_eq!(groups[1].thread_id, "t1");
    mock.assert_async().await;
}

#[tokio::test]
async fn total_recordings_sums_all_groups_from_cache() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/output-info")
        .with_status(200)
        .with_body(OUTPUT_INFO)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    client.groups().await.unwrap();
    // Second decode comes from cache; still one round trip.
    assert_eq!(client.total_recordings().await.unwrap(), 3);
    mock.assert_async().await;
}

#[tokio::test]
async fn unsuccessful_output_info_is_a_terminal_api_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/output-info")
        .with_status(200)
        .with_body(r#"{"success": false, "data": {}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.groups().await.unwrap_err();

    // The backend rejected the request at the application level. That is
    // not a decode problem and must not be retried.
    assert!(matches!(err, Error::Api(_)));
    assert!(!err.is_retryable());
    mock.assert_async().await;
}
