// Gemini API client (API key authentication)
// Author: kelexine (https://github.com/kelexine)

use super::ContentGenerator;
use crate::config::GeminiConfig;
use crate::error::{RelayError, Result};
use crate::metrics;
use crate::models::circuit::ApiKey;
use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse};
use crate::utils::logging::sanitize;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Client for the public Google Gemini REST API.
///
/// The API key travels with each call, so one client serves every caller.
/// Failures are returned immediately; there is no retry.
pub struct GeminiClient {
    http_client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client with a pooled HTTP connection.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls()
            .build()
            .map_err(|e| RelayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created Gemini HTTP client for {}", config.api_base_url);

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    /// Get the API base_url
    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            urlencoding::encode(model)
        )
    }

    /// Extract error message from API response JSON
    fn extract_error_message(response_text: &str) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(serde::Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(response_text) {
            if let Some(error) = error_resp.error {
                return error.message.or(error.status);
            }
        }
        None
    }

    /// Map a non-success status and body to the matching error variant.
    fn classify_error(status: StatusCode, body: &str) -> RelayError {
        let message = Self::extract_error_message(body).unwrap_or_else(|| body.to_string());
        let key_rejected = body.contains("API_KEY_INVALID") || body.contains("API key not valid");

        match status.as_u16() {
            400 if key_rejected => RelayError::InvalidCredentials(message),
            401 | 403 => RelayError::InvalidCredentials(message),
            429 => RelayError::QuotaExceeded(message),
            503 | 504 => RelayError::ServiceUnavailable(message),
            _ => RelayError::GeminiApi(format!("HTTP {}: {}", status.as_u16(), message)),
        }
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    /// Call Gemini `generateContent`.
    async fn generate_content(
        &self,
        api_key: &ApiKey,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        if api_key.is_blank() {
            return Err(RelayError::InvalidCredentials("API key is empty".to_string()));
        }

        let url = self.endpoint(model);
        debug!("Calling generateContent API for model: {}", model);

        let start = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                metrics::record_gemini_call(model, 0, start.elapsed().as_secs_f64());
                RelayError::Http(e)
            })?;

        let status = response.status();
        metrics::record_gemini_call(model, status.as_u16(), start.elapsed().as_secs_f64());

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Gemini API error: HTTP {} - Response body: {}",
                status,
                sanitize(&error_text)
            );
            return Err(Self::classify_error(status, &error_text));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| RelayError::GeminiApi(format!("Failed to read response body: {}", e)))?;

        debug!(
            "Raw Gemini response (first 500 chars): {}",
            response_text.chars().take(500).collect::<String>()
        );

        let gemini_response: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| {
                error!("Failed to parse Gemini response: {}", e);
                RelayError::GeminiApi(format!("Response parsing error: {}", e))
            })?;

        debug!(
            "Received Gemini response in {:?} with {} candidate(s)",
            start.elapsed(),
            gemini_response.candidates.len()
        );
        Ok(gemini_response)
    }
}
