use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use geo_shopper::config::AppConfig;
use geo_shopper::{router, AppState};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

fn config_for(server: &MockServer, search_key: Option<&str>) -> AppConfig {
    let mut config = AppConfig::default();
    config.search.api_key = search_key.map(str::to_string);
    config.search.base_url = server.base_url();
    config.translation.base_url = server.url("/v1");
    config.request_timeout_seconds = 5;
    config
}

async fn post_json(state: AppState, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?;

    let response = router(state).oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn test_multi_source_search_through_serpapi() -> Result<()> {
    let server = MockServer::start_async().await;
    let serp_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("engine", "google_shopping")
                .query_param("q", "notebook")
                .query_param("gl", "sk")
                .query_param("hl", "en")
                .query_param("api_key", "serp-test-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "search_metadata": {"status": "Success"},
                    "shopping_results": [
                        {
                            "position": 1,
                            "title": "ASUS Vivobook 15",
                            "product_id": "1001",
                            "multiple_sources": true,
                            "price": "529,00 €",
                            "extracted_price": 529.0,
                            "thumbnail": "https://example.test/a.jpg"
                        },
                        {
                            "position": 2,
                            "title": "HP 250 G9",
                            "product_id": "1002",
                            "source": "Datart.sk",
                            "price": "479,00 €"
                        },
                        "not-an-object"
                    ]
                }));
        })
        .await;

    let state = AppState::from_config(&config_for(&server, Some("serp-test-key")))?;
    let (status, body) = post_json(
        state,
        "/api/search",
        json!({"query": "laptop", "geolocation": "sk"}),
    )
    .await?;

    serp_mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["geolocation"], "sk");
    assert_eq!(body["originalQuery"], "laptop");
    assert_eq!(body["translatedQuery"], "notebook");
    assert_eq!(body["totalResults"], 1);
    assert_eq!(body["results"][0]["title"], "ASUS Vivobook 15");
    // 未知欄位原樣保留
    assert_eq!(body["results"][0]["thumbnail"], "https://example.test/a.jpg");
    assert_eq!(body["results"][0]["position"], 1);
    assert_eq!(body["results"][0]["extracted_price"], 529.0);
    Ok(())
}

#[tokio::test]
async fn test_missing_search_key_makes_no_request() -> Result<()> {
    let server = MockServer::start_async().await;
    let serp_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/search.json");
            then.status(200).json_body(json!({"shopping_results": []}));
        })
        .await;

    let state = AppState::from_config(&config_for(&server, Some("your_serpapi_key_here")))?;
    let (status, body) = post_json(
        state,
        "/api/search-single-source",
        json!({"query": "headphones", "geolocation": "de"}),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_code"], "SEARCH_FAILED");
    assert_eq!(serp_mock.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_provider_error_is_echoed_in_details() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search.json");
            then.status(401).json_body(json!({"error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key"}));
        })
        .await;

    let state = AppState::from_config(&config_for(&server, Some("expired")))?;
    let (status, body) = post_json(
        state,
        "/api/product-details",
        json!({"productId": "1001", "geolocation": "sk"}),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], true);
    assert_eq!(body["status"], 500);
    assert_eq!(body["error_code"], "SEARCH_FAILED");
    assert!(body["details"]["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid API key."));
    Ok(())
}

#[tokio::test]
async fn test_remote_translation_feeds_search_query() -> Result<()> {
    let server = MockServer::start_async().await;
    let translate_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("Authorization", "Bearer sk-test");
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": "\"Kaffeemaschine\""}}]
            }));
        })
        .await;
    let serp_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("q", "Kaffeemaschine")
                .query_param("gl", "de");
            then.status(200).json_body(json!({"shopping_results": []}));
        })
        .await;

    let mut config = config_for(&server, Some("serp-test-key"));
    config.translation.api_key = Some("sk-test".to_string());

    let state = AppState::from_config(&config)?;
    let (status, body) = post_json(
        state,
        "/api/search-single-source",
        json!({"query": "coffee maker", "geolocation": "de"}),
    )
    .await?;

    translate_mock.assert_async().await;
    serp_mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translatedQuery"], "Kaffeemaschine");
    assert_eq!(body["totalResults"], 0);
    Ok(())
}
