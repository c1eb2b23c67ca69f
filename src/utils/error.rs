use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoShopError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid geolocation: {code}")]
    InvalidMarket { code: String },

    #[error("Search failed: {message}")]
    SearchFailed {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Translation failed: {message}")]
    TranslationFailed { message: String },

    #[error("Export failed: {message}")]
    ExportFailed { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類，用於日誌與 HTTP 狀態對應
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Upstream,
    Export,
    Configuration,
    Internal,
}

impl GeoShopError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn search_failed(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self::SearchFailed {
            message: message.into(),
            details,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } | Self::InvalidMarket { .. } => ErrorCategory::Validation,
            Self::SearchFailed { .. } | Self::TranslationFailed { .. } => ErrorCategory::Upstream,
            Self::ExportFailed { .. } | Self::ZipError(_) | Self::CsvError(_) => {
                ErrorCategory::Export
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) => ErrorCategory::Internal,
        }
    }

    /// 呼叫端輸入造成的錯誤 (HTTP 4xx)
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }
}

pub type Result<T> = std::result::Result<T, GeoShopError>;
