//! Integration tests for catalog paging against a mock listing endpoint.

mod support;

use std::sync::Arc;

use exporter_core::transport::{ReqwestSender, build_http_client};
use exporter_core::{
    AuthenticatedTransport, Authenticator, CatalogLister, Credentials, HttpSettings, ListRequest,
};
use support::provider::Provider;
use support::socket_guard::start_mock_server_or_skip;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn lister(provider: &Provider) -> CatalogLister {
    provider.mount_login().await;
    let client = build_http_client(HttpSettings::default()).unwrap();
    let endpoints = Arc::new(provider.endpoints());
    let auth = Arc::new(Authenticator::new(
        client.clone(),
        &endpoints,
        Credentials::new("me@example.com", "secret"),
    ));
    auth.authenticate().await.unwrap();
    let transport = AuthenticatedTransport::new(Arc::new(ReqwestSender::new(client)), auth);
    CatalogLister::new(transport, endpoints)
}

fn ids(items: &[exporter_core::CatalogItem]) -> Vec<&str> {
    items.iter().map(|item| item.item_id.as_str()).collect()
}

#[tokio::test]
async fn test_overlapping_pages_are_merged_without_duplicates() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let provider = Provider::new(server);
    provider
        .mount_page(0, 5, &[("A", "Alpha"), ("B", "Beta"), ("C", "Gamma")])
        .await;
    provider
        .mount_page(3, 6, &[("C", "Gamma again"), ("D", "Delta"), ("E", "Epsilon")])
        .await;

    let request = ListRequest {
        page_size: 3,
        ..ListRequest::default()
    };
    let items = lister(&provider).await.list(&request).await.unwrap();

    assert_eq!(ids(&items), ["A", "B", "C", "D", "E"]);
    assert_eq!(items[2].display_name, "Gamma");
}

#[tokio::test]
async fn test_limit_truncates_an_oversized_page() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let provider = Provider::new(server);
    Mock::given(method("GET"))
        .and(path("/entitlements-v1/users/me/products"))
        .and(query_param("limit", "2"))
        .and(query_param("sort", "createdAt:DESC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 3,
            "data": [{"productId": "A"}, {"productId": "B"}, {"productId": "C"}],
        })))
        .expect(1)
        .mount(&provider.server)
        .await;

    let request = ListRequest {
        limit: Some(2),
        ..ListRequest::default()
    };
    let items = lister(&provider).await.list(&request).await.unwrap();

    assert_eq!(ids(&items), ["A", "B"]);
    assert_eq!(items[0].display_name, "A");
}

#[tokio::test]
async fn test_empty_page_stops_paging() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let provider = Provider::new(server);
    provider.mount_page(0, 10, &[("A", "Alpha"), ("B", "Beta")]).await;
    provider.mount_page(2, 10, &[]).await;
    Mock::given(method("GET"))
        .and(path("/entitlements-v1/users/me/products"))
        .and(query_param("offset", "4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider.server)
        .await;

    let request = ListRequest {
        page_size: 2,
        ..ListRequest::default()
    };
    let items = lister(&provider).await.list(&request).await.unwrap();

    assert_eq!(ids(&items), ["A", "B"]);
}

#[tokio::test]
async fn test_listing_failure_is_returned() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let provider = Provider::new(server);
    Mock::given(method("GET"))
        .and(path("/entitlements-v1/users/me/products"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&provider.server)
        .await;

    let err = lister(&provider)
        .await
        .list(&ListRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(503));
}
