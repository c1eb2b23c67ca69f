pub mod error;
pub mod handlers;

pub use error::{ApiError, ApiResult};

use crate::adapters::{OpenAiTranslator, SerpApiClient};
use crate::config::AppConfig;
use crate::core::buffer::ResultBuffer;
use crate::core::markets::MarketRegistry;
use crate::core::search::SearchOrchestrator;
use crate::core::translator::Translator;
use crate::domain::ports::{ShoppingSearchProvider, TranslationProvider};
use crate::utils::error::{GeoShopError, Result};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared handler state. Cloning shares the same buffer.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchOrchestrator>,
    pub buffer: Arc<ResultBuffer>,
}

impl AppState {
    pub fn new(search: Arc<SearchOrchestrator>, buffer: Arc<ResultBuffer>) -> Self {
        Self { search, buffer }
    }

    /// Wires the built-in markets and the given capabilities into a fresh state.
    pub fn with_providers(
        translation: Option<Arc<dyn TranslationProvider>>,
        search: Arc<dyn ShoppingSearchProvider>,
        ui_language: impl Into<String>,
    ) -> Self {
        let orchestrator = SearchOrchestrator::new(
            Arc::new(MarketRegistry::builtin()),
            Arc::new(Translator::new(translation)),
            search,
            ui_language,
        );
        Self::new(Arc::new(orchestrator), Arc::new(ResultBuffer::new()))
    }

    /// Builds the remote clients described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GeoShopError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let translation = config.translation_api_key().map(|key| {
            Arc::new(OpenAiTranslator::new(
                client.clone(),
                key,
                config.translation.model.clone(),
                config.translation.base_url.clone(),
            )) as Arc<dyn TranslationProvider>
        });
        if translation.is_none() {
            tracing::info!("ℹ️ No translation credential, using the built-in phrasebook");
        }

        let search = SerpApiClient::new(
            client,
            config.search_api_key().map(str::to_string),
            config.search.base_url.clone(),
        );
        if !search.is_configured() {
            tracing::warn!("⚠️ SERPAPI_API_KEY is not set, searches will fail");
        }

        Ok(Self::with_providers(
            translation,
            Arc::new(search),
            config.search.ui_language.clone(),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/geolocations", get(handlers::list_geolocations))
        .route("/api/translate", post(handlers::translate))
        .route("/api/search", post(handlers::search_multi_source))
        .route("/api/search-single-source", post(handlers::search_single_source))
        .route("/api/product-details", post(handlers::product_details))
        .route("/api/save-to-excel", post(handlers::save_record))
        .route("/api/save-multiple-to-excel", post(handlers::save_records))
        .route("/api/export-excel", get(handlers::export_excel))
        .route("/api/export-csv", get(handlers::export_csv))
        .route("/api/excel-data-count", get(handlers::buffer_summary))
        .route("/api/excel-data", delete(handlers::clear_buffer))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
