use crate::utils::error::{ErrorCategory, GeoShopError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::fmt;

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            error_code: Some("INTERNAL_ERROR".to_string()),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
            error_code: Some("BAD_REQUEST".to_string()),
            details: None,
        }
    }

    fn with_code(mut self, code: &str) -> Self {
        self.error_code = Some(code.to_string());
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response_json = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16()
        });

        if let Some(error_code) = self.error_code {
            response_json["error_code"] = json!(error_code);
        }
        if let Some(details) = self.details {
            response_json["details"] = details;
        }

        (self.status_code, Json(response_json)).into_response()
    }
}

impl From<GeoShopError> for ApiError {
    fn from(err: GeoShopError) -> Self {
        if err.is_client_error() {
            tracing::warn!("⚠️ Rejected request: {}", err);
        } else {
            tracing::error!("❌ Request failed: {} (category: {:?})", err, err.category());
        }

        match err {
            GeoShopError::InvalidMarket { code } => {
                ApiError::bad_request(format!("Invalid geolocation: {}", code))
                    .with_code("INVALID_GEOLOCATION")
            }
            GeoShopError::ValidationError { message } => {
                ApiError::bad_request(message).with_code("VALIDATION_ERROR")
            }
            GeoShopError::SearchFailed { message, details } => ApiError {
                details,
                ..ApiError::internal(message).with_code("SEARCH_FAILED")
            },
            other if other.category() == ErrorCategory::Export => {
                ApiError::internal(format!("Failed to export data: {}", other))
                    .with_code("EXPORT_FAILED")
            }
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
            .with_code("VALIDATION_ERROR")
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
