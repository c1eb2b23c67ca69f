use crate::config::AppConfig;
use crate::utils::error::{GeoShopError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional TOML configuration file. Every field may be omitted; present fields
/// override the defaults.
///
/// ```toml
/// [server]
/// port = 8080
///
/// [translation]
/// api_key = "${OPENAI_API_KEY}"
///
/// [search]
/// api_key = "${SERPAPI_API_KEY}"
/// ui_language = "en"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub translation: Option<TranslationSection>,
    pub search: Option<SearchSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub request_timeout_seconds: Option<u64>,
    pub log_json: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub ui_language: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GeoShopError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GeoShopError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GeoShopError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Overlays the fields present in this file onto `config`.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(server) = &self.server {
            if let Some(host) = &server.host {
                config.host = host.clone();
            }
            if let Some(port) = server.port {
                config.port = port;
            }
            if let Some(timeout) = server.request_timeout_seconds {
                config.request_timeout_seconds = timeout;
            }
            if let Some(log_json) = server.log_json {
                config.log_json = log_json;
            }
        }

        if let Some(translation) = &self.translation {
            if let Some(key) = &translation.api_key {
                config.translation.api_key = Some(key.clone());
            }
            if let Some(model) = &translation.model {
                config.translation.model = model.clone();
            }
            if let Some(url) = &translation.base_url {
                config.translation.base_url = url.clone();
            }
        }

        if let Some(search) = &self.search {
            if let Some(key) = &search.api_key {
                config.search.api_key = Some(key.clone());
            }
            if let Some(url) = &search.base_url {
                config.search.base_url = url.clone();
            }
            if let Some(language) = &search.ui_language {
                config.search.ui_language = language.clone();
            }
        }
    }
}
