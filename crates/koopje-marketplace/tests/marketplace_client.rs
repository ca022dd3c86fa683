//! Integration tests for `MarketplaceClient::search` using wiremock.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use koopje_marketplace::{resolve_category, MarketplaceClient, MarketplaceError, SearchQuery};

fn test_client(base_url: &str) -> MarketplaceClient {
    MarketplaceClient::with_base_url(base_url, 5, "koopje-test/0.1")
        .expect("failed to build test MarketplaceClient")
}

fn accesspoints_query() -> SearchQuery {
    SearchQuery::recent(
        resolve_category("Accesspoints").expect("bundled category"),
        "8334SX",
        1_000_000,
    )
}

#[tokio::test]
async fn search_returns_listings_in_server_order() {
    let server = MockServer::start().await;

    let body = json!({
        "listings": [
            {
                "itemId": "m2",
                "title": "UniFi U6 Pro",
                "description": "Ubiquiti access point, werkt prima",
                "vipUrl": "/v/computers-en-software/accesspoints/m2-unifi-u6-pro",
                "priceInfo": { "priceCents": 9500, "priceType": "FIXED" }
            },
            {
                "itemId": "m1",
                "title": "Oude router",
                "vipUrl": "/v/computers-en-software/accesspoints/m1-oude-router",
                "priceInfo": { "priceCents": 0, "priceType": "SEE_DESCRIPTION" }
            }
        ],
        "totalResultCount": 2
    });

    Mock::given(method("GET"))
        .and(path("/lrp/api/search"))
        .and(query_param("l2CategoryId", "3022"))
        .and(query_param("limit", "50"))
        .and(query_param("postcode", "8334SX"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let listings = client
        .search(&accesspoints_query())
        .await
        .expect("search should succeed");

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].title, "UniFi U6 Pro");
    assert_eq!(listings[0].price, Some(95.0));
    assert_eq!(
        listings[0].link,
        format!(
            "{}/v/computers-en-software/accesspoints/m2-unifi-u6-pro",
            server.uri()
        )
    );
    assert_eq!(listings[1].price, None);
    assert_eq!(listings[1].description, "");
}

#[tokio::test]
async fn search_with_no_listings_returns_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lrp/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "listings": [] })))
        .mount(&server)
        .await;

    let listings = test_client(&server.uri())
        .search(&accesspoints_query())
        .await
        .unwrap();
    assert!(listings.is_empty());
}

#[tokio::test]
async fn search_surfaces_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lrp/api/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search(&accesspoints_query())
        .await
        .unwrap_err();
    assert!(
        matches!(err, MarketplaceError::UnexpectedStatus { status: 503, .. }),
        "expected UnexpectedStatus(503), got: {err:?}"
    );
}

#[tokio::test]
async fn search_surfaces_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/lrp/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search(&accesspoints_query())
        .await
        .unwrap_err();
    assert!(
        matches!(err, MarketplaceError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
}
