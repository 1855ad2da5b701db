// Error types for circuit-relay
// Author: kelexine (https://github.com/kelexine)

use crate::models::circuit::CircuitResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Message shown to the caller when Gemini rejects the API key.
pub const INVALID_KEY_MESSAGE: &str = "Invalid API key. Please check your Gemini API key.";

/// Message shown to the caller when the Gemini quota is exhausted.
pub const QUOTA_MESSAGE: &str = "API quota exceeded. Please check your Gemini API usage.";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gemini API error: {0}")]
    GeminiApi(String),

    #[error("Invalid API_KEY: {0}")]
    InvalidCredentials(String),

    #[error("Gemini quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Human-readable message for the `error` field of a failed response.
    ///
    /// Credential and quota problems get fixed wording; everything else is
    /// passed through as the error's display text.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::InvalidCredentials(_) => return INVALID_KEY_MESSAGE.to_string(),
            RelayError::QuotaExceeded(_) => return QUOTA_MESSAGE.to_string(),
            _ => {}
        }

        let message = self.to_string();
        if message.contains("API_KEY") {
            INVALID_KEY_MESSAGE.to_string()
        } else if message.to_lowercase().contains("quota") {
            QUOTA_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidCredentials(_) => "credentials",
            RelayError::QuotaExceeded(_) => "quota",
            RelayError::ServiceUnavailable(_) => "unavailable",
            RelayError::GeminiApi(_) | RelayError::Http(_) => "upstream",
            RelayError::InvalidRequest(_) | RelayError::PayloadTooLarge(_) => "invalid_request",
            RelayError::ImageDecode(_) => "image_decode",
            _ => "internal",
        }
    }
}

// Failed requests still answer with the canonical response shape
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            RelayError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            RelayError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::GeminiApi(_) | RelayError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = CircuitResponse::failure(self.user_message());
        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
