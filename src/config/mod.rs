#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::{GeoShopError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com";
pub const DEFAULT_UI_LANGUAGE: &str = "en";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub ui_language: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_SERPAPI_BASE_URL.to_string(),
            ui_language: DEFAULT_UI_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub log_json: bool,
    pub translation: TranslationSettings,
    pub search: SearchSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            log_json: false,
            translation: TranslationSettings::default(),
            search: SearchSettings::default(),
        }
    }
}

/// 判斷金鑰是否為範本預設值 (例如 `your_openai_api_key_here`)
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    let lower = key.to_lowercase();
    key.is_empty()
        || lower.starts_with("your_")
        || lower.starts_with("your-")
        || lower.contains("placeholder")
        || lower == "changeme"
        || key.starts_with("${")
}

fn usable_key(key: &Option<String>) -> Option<&str> {
    key.as_deref().filter(|k| !is_placeholder_key(k))
}

impl AppConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_env("PORT", &port)?;
        }
        if let Some(timeout) = lookup("REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = parse_env("REQUEST_TIMEOUT_SECONDS", &timeout)?;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.translation.api_key = Some(key);
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.translation.model = model;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.translation.base_url = url;
        }
        if let Some(key) = lookup("SERPAPI_API_KEY") {
            self.search.api_key = Some(key);
        }
        if let Some(url) = lookup("SERPAPI_BASE_URL") {
            self.search.base_url = url;
        }
        if let Some(language) = lookup("SEARCH_UI_LANGUAGE") {
            self.search.ui_language = language;
        }
        Ok(())
    }

    /// Translation credential, unless absent or a template placeholder.
    pub fn translation_api_key(&self) -> Option<&str> {
        usable_key(&self.translation.api_key)
    }

    pub fn search_api_key(&self) -> Option<&str> {
        usable_key(&self.search.api_key)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_seconds)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| GeoShopError::InvalidConfigValueError {
            field: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("host", &self.host)?;
        validate_range("port", self.port, 1, u16::MAX)?;
        validate_positive_number("request_timeout_seconds", self.request_timeout_seconds, 1)?;
        validate_url("translation.base_url", &self.translation.base_url)?;
        validate_non_empty_string("translation.model", &self.translation.model)?;
        validate_url("search.base_url", &self.search.base_url)?;
        validate_non_empty_string("search.ui_language", &self.search.ui_language)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(config.translation_api_key().is_none());
        assert!(config.search_api_key().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("PORT", "8080"),
                ("OPENAI_API_KEY", "sk-live-123"),
                ("SERPAPI_API_KEY", "serp-456"),
                ("SERPAPI_BASE_URL", "http://127.0.0.1:9999"),
            ]))
            .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.translation_api_key(), Some("sk-live-123"));
        assert_eq!(config.search_api_key(), Some("serp-456"));
        assert_eq!(config.search.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.translation.model, DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_bad_port_is_config_error() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(
            err,
            GeoShopError::InvalidConfigValueError { ref field, .. } if field == "PORT"
        ));
    }

    #[test]
    fn test_placeholder_keys_disable_translation() {
        for key in [
            "",
            "  ",
            "your_openai_api_key_here",
            "YOUR-KEY",
            "placeholder",
            "changeme",
            "${OPENAI_API_KEY}",
        ] {
            assert!(is_placeholder_key(key), "{key:?} should be a placeholder");
        }
        assert!(!is_placeholder_key("sk-proj-abc123"));

        let mut config = AppConfig::default();
        config.translation.api_key = Some("your_openai_api_key_here".to_string());
        assert!(config.translation_api_key().is_none());
    }

    #[test]
    fn test_validation_rejects_bad_urls() {
        let mut config = AppConfig::default();
        config.search.base_url = "serpapi.com".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
