use crate::domain::model::{ProductQuery, ShoppingQuery};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Remote translation capability (an LLM chat endpoint).
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, system_prompt: &str, user_query: &str) -> Result<String>;
}

/// Remote shopping-search capability.
///
/// Both calls return the provider's raw JSON payload; parsing and filtering belong to the
/// search orchestrator. Transport or provider failures must come back as
/// `GeoShopError::SearchFailed`.
#[async_trait]
pub trait ShoppingSearchProvider: Send + Sync {
    async fn search(&self, query: &ShoppingQuery) -> Result<serde_json::Value>;
    async fn product_details(&self, query: &ProductQuery) -> Result<serde_json::Value>;
}
