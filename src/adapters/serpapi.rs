use crate::domain::model::{ProductQuery, ShoppingQuery};
use crate::domain::ports::ShoppingSearchProvider;
use crate::utils::error::{GeoShopError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

pub const SHOPPING_ENGINE: &str = "google_shopping";
pub const PRODUCT_ENGINE: &str = "google_product";

/// SerpApi client for the shopping and product-detail engines.
pub struct SerpApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(client: Client, api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn call(&self, params: &[(&str, &str)]) -> Result<Value> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GeoShopError::search_failed(
                "Search provider credential is not configured (set SERPAPI_API_KEY)",
                None,
            ));
        };

        let url = format!("{}/search.json", self.base_url);
        tracing::debug!("Making SerpApi request: {:?}", params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("api_key", api_key)])
            .send()
            .await
            .map_err(|e| {
                GeoShopError::search_failed(format!("Search request failed: {}", e), None)
            })?;

        let status = response.status();
        tracing::debug!("SerpApi response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| {
                GeoShopError::search_failed(format!("Failed to read search response: {}", e), None)
            })?;
        let payload: Option<Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = payload
                .as_ref()
                .and_then(|p| p.get("error"))
                .and_then(Value::as_str)
                .map(|e| format!("Search provider returned {}: {}", status, e))
                .unwrap_or_else(|| format!("Search provider returned {}", status));
            tracing::error!("❌ {}", message);
            return Err(GeoShopError::search_failed(
                message,
                payload.or_else(|| (!body.is_empty()).then(|| Value::String(body))),
            ));
        }

        let payload = payload.ok_or_else(|| {
            GeoShopError::search_failed("Search provider returned a non-JSON body", None)
        })?;

        // SerpApi 以 200 + `error` 欄位回報邏輯錯誤
        if let Some(error) = payload.get("error").and_then(Value::as_str) {
            tracing::warn!("⚠️ Search provider reported an error: {}", error);
            return Err(GeoShopError::search_failed(
                format!("Search provider error: {}", error),
                Some(payload),
            ));
        }

        Ok(payload)
    }
}

#[async_trait]
impl ShoppingSearchProvider for SerpApiClient {
    async fn search(&self, query: &ShoppingQuery) -> Result<Value> {
        self.call(&[
            ("engine", SHOPPING_ENGINE),
            ("q", query.query.as_str()),
            ("gl", query.country.as_str()),
            ("hl", query.language.as_str()),
        ])
        .await
    }

    async fn product_details(&self, query: &ProductQuery) -> Result<Value> {
        self.call(&[
            ("engine", PRODUCT_ENGINE),
            ("product_id", query.product_id.as_str()),
            ("gl", query.country.as_str()),
            ("hl", query.language.as_str()),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn shopping_query() -> ShoppingQuery {
        ShoppingQuery {
            query: "notebook".to_string(),
            country: "sk".to_string(),
            language: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_sends_engine_and_market() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search.json")
                    .query_param("engine", "google_shopping")
                    .query_param("q", "notebook")
                    .query_param("gl", "sk")
                    .query_param("hl", "en")
                    .query_param("api_key", "test-key");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"shopping_results": [{"title": "Acer"}]}));
            })
            .await;

        let client =
            SerpApiClient::new(Client::new(), Some("test-key".to_string()), server.base_url());
        let payload = client.search(&shopping_query()).await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(payload["shopping_results"][0]["title"], "Acer");
    }

    #[tokio::test]
    async fn test_product_details_uses_product_engine() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search.json")
                    .query_param("engine", "google_product")
                    .query_param("product_id", "4887235756540435899")
                    .query_param("gl", "de");
                then.status(200)
                    .json_body(json!({"product_results": {"title": "Kopfhörer"}}));
            })
            .await;

        let client = SerpApiClient::new(
            Client::new(),
            Some("k".to_string()),
            format!("{}/", server.base_url()),
        );
        let payload = client
            .product_details(&ProductQuery {
                product_id: "4887235756540435899".to_string(),
                country: "de".to_string(),
                language: "en".to_string(),
            })
            .await
            .unwrap();

        api_mock.assert_async().await;
        assert_eq!(payload["product_results"]["title"], "Kopfhörer");
    }

    #[tokio::test]
    async fn test_http_error_carries_provider_body() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/search.json");
                then.status(401).json_body(json!({"error": "Invalid API key."}));
            })
            .await;

        let client = SerpApiClient::new(Client::new(), Some("bad".to_string()), server.base_url());
        let err = client.search(&shopping_query()).await.unwrap_err();

        api_mock.assert_async().await;
        match err {
            GeoShopError::SearchFailed { message, details } => {
                assert!(message.contains("401"));
                assert!(message.contains("Invalid API key."));
                assert_eq!(details.unwrap()["error"], "Invalid API key.");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_field_in_success_body_is_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search.json");
                then.status(200)
                    .json_body(json!({"error": "Google hasn't returned any results for this query."}));
            })
            .await;

        let client = SerpApiClient::new(Client::new(), Some("k".to_string()), server.base_url());
        let err = client.search(&shopping_query()).await.unwrap_err();
        assert!(matches!(err, GeoShopError::SearchFailed { details: Some(_), .. }));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/search.json");
                then.status(200).json_body(json!({}));
            })
            .await;

        let client = SerpApiClient::new(Client::new(), None, server.base_url());
        assert!(!client.is_configured());

        let err = client.search(&shopping_query()).await.unwrap_err();
        assert!(matches!(err, GeoShopError::SearchFailed { details: None, .. }));
        assert_eq!(api_mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_search_failed() {
        // 沒有服務在此埠口監聽
        let client = SerpApiClient::new(Client::new(), Some("k".to_string()), "http://127.0.0.1:1");
        let err = client.search(&shopping_query()).await.unwrap_err();
        assert!(matches!(err, GeoShopError::SearchFailed { .. }));
    }
}
