use crate::domain::ports::TranslationProvider;
use crate::utils::error::{GeoShopError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// OpenAI-compatible chat completions client used for query translation.
pub struct OpenAiTranslator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiTranslator {
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TranslationProvider for OpenAiTranslator {
    async fn translate(&self, system_prompt: &str, user_query: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_query},
            ],
            "temperature": 0.3,
            "max_tokens": 100,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeoShopError::TranslationFailed {
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeoShopError::TranslationFailed {
                message: format!("translation API error {}: {}", status, error_text),
            });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| GeoShopError::TranslationFailed {
                message: format!("invalid response body: {}", e),
            })?;

        raw["choices"][0]["message"]["content"]
            .as_str()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| GeoShopError::TranslationFailed {
                message: "no message content in translation response".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_translate_posts_chat_completion() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("Authorization", "Bearer sk-test")
                    .json_body_partial(r#"{"model": "gpt-4o-mini", "max_tokens": 100}"#);
                then.status(200).json_body(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": " notebook \n"}}]
                }));
            })
            .await;

        let translator = OpenAiTranslator::new(
            Client::new(),
            "sk-test",
            "gpt-4o-mini",
            server.url("/v1"),
        );
        let text = translator.translate("Translate to Slovak", "laptop").await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(text, "notebook");
    }

    #[tokio::test]
    async fn test_api_error_is_translation_failed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let translator =
            OpenAiTranslator::new(Client::new(), "sk-test", "gpt-4o-mini", server.base_url());
        let err = translator.translate("prompt", "laptop").await.unwrap_err();
        match err {
            GeoShopError::TranslationFailed { message } => {
                assert!(message.contains("429"));
                assert!(message.contains("rate limited"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_content_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(serde_json::json!({"choices": []}));
            })
            .await;

        let translator =
            OpenAiTranslator::new(Client::new(), "sk-test", "gpt-4o-mini", server.base_url());
        assert!(translator.translate("prompt", "laptop").await.is_err());
    }
}
