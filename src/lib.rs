pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{ConfigArgs, ServeArgs};

pub use adapters::{LocalStorage, OpenAiTranslator, SerpApiClient};
pub use api::{router, AppState};
pub use config::AppConfig;
pub use core::{buffer::ResultBuffer, search::SearchOrchestrator, translator::Translator};
pub use utils::error::{GeoShopError, Result};
