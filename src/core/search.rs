use crate::core::markets::MarketRegistry;
use crate::core::translator::Translator;
use crate::domain::model::{
    Market, ProductDetails, ProductDetailsRequest, ProductQuery, ResultSet, SearchRequest,
    ShoppingItem, ShoppingQuery, TranslationResult,
};
use crate::domain::ports::ShoppingSearchProvider;
use crate::utils::error::Result;
use crate::utils::validation::require_fields;
use serde_json::Value;
use std::sync::Arc;

/// Seller-cardinality filter applied to search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFilter {
    MultiSource,
    SingleSource,
}

/// Split items into (multi-source, single-source), keeping provider order in each.
pub fn partition_by_sources(items: Vec<ShoppingItem>) -> (Vec<ShoppingItem>, Vec<ShoppingItem>) {
    items.into_iter().partition(ShoppingItem::is_multi_source)
}

/// 解析 `shopping_results`：缺少或格式錯誤時回傳空列表
pub fn parse_shopping_results(payload: &Value) -> Vec<ShoppingItem> {
    let Some(items) = payload.get("shopping_results").and_then(Value::as_array) else {
        tracing::debug!("No shopping_results array in provider payload");
        return Vec::new();
    };

    items
        .iter()
        .filter(|raw| raw.is_object())
        .filter_map(|raw| match serde_json::from_value::<ShoppingItem>(raw.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!("Skipping malformed shopping result: {}", e);
                None
            }
        })
        .collect()
}

pub struct SearchOrchestrator {
    markets: Arc<MarketRegistry>,
    translator: Arc<Translator>,
    provider: Arc<dyn ShoppingSearchProvider>,
    ui_language: String,
}

impl SearchOrchestrator {
    pub fn new(
        markets: Arc<MarketRegistry>,
        translator: Arc<Translator>,
        provider: Arc<dyn ShoppingSearchProvider>,
        ui_language: impl Into<String>,
    ) -> Self {
        Self {
            markets,
            translator,
            provider,
            ui_language: ui_language.into(),
        }
    }

    pub fn markets(&self) -> &MarketRegistry {
        &self.markets
    }

    /// Validates the request, resolves its market and translates the query.
    /// No remote search call is made.
    pub async fn translate_request(
        &self,
        request: &SearchRequest,
    ) -> Result<(Market, TranslationResult)> {
        require_fields(&[
            ("query", request.query.as_deref()),
            ("geolocation", request.geolocation.as_deref()),
        ])?;
        let query = request.query.as_deref().unwrap_or_default().trim();
        let market = self
            .markets
            .resolve(request.geolocation.as_deref().unwrap_or_default())?;

        let translation = self.translator.translate(query, &market).await;
        Ok((market, translation))
    }

    pub async fn search_multi_source(&self, request: &SearchRequest) -> Result<ResultSet> {
        self.search(request, SourceFilter::MultiSource).await
    }

    pub async fn search_single_source(&self, request: &SearchRequest) -> Result<ResultSet> {
        self.search(request, SourceFilter::SingleSource).await
    }

    pub async fn search(&self, request: &SearchRequest, filter: SourceFilter) -> Result<ResultSet> {
        let (market, translation) = self.translate_request(request).await?;

        tracing::info!(
            "🔎 Searching {} {} for '{}' (translated: '{}', filter: {:?})",
            market.flag,
            market.code,
            translation.original_query,
            translation.translated_query,
            filter
        );

        let payload = self
            .provider
            .search(&ShoppingQuery {
                query: translation.translated_query.clone(),
                country: market.code.to_string(),
                language: self.ui_language.clone(),
            })
            .await?;

        let items = parse_shopping_results(&payload);
        let fetched = items.len();
        let (multi, single) = partition_by_sources(items);
        let results = match filter {
            SourceFilter::MultiSource => multi,
            SourceFilter::SingleSource => single,
        };

        tracing::info!(
            "📦 {} of {} results kept for {} ({:?})",
            results.len(),
            fetched,
            market.code,
            filter
        );

        Ok(ResultSet {
            geolocation: market.code.to_string(),
            geo_info: market,
            original_query: translation.original_query,
            translated_query: translation.translated_query,
            total_results: results.len(),
            results,
        })
    }

    pub async fn fetch_product_details(
        &self,
        request: &ProductDetailsRequest,
    ) -> Result<ProductDetails> {
        require_fields(&[
            ("productId", request.product_id.as_deref()),
            ("geolocation", request.geolocation.as_deref()),
        ])?;
        let product_id = request.product_id.as_deref().unwrap_or_default().trim();
        let market = self
            .markets
            .resolve(request.geolocation.as_deref().unwrap_or_default())?;

        tracing::info!("🔎 Fetching product {} in {}", product_id, market.code);

        let payload = self
            .provider
            .product_details(&ProductQuery {
                product_id: product_id.to_string(),
                country: market.code.to_string(),
                language: self.ui_language.clone(),
            })
            .await?;

        Ok(ProductDetails {
            product_details: payload,
            geolocation: market.code.to_string(),
            geo_info: market,
        })
    }
}
