// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::error::RelayError;
use crate::metrics;
use crate::models::circuit::{CircuitRequest, CircuitResponse};
use crate::translation::{build_request, translate_response, PreparedRequest};
use axum::extract::rejection::BytesRejection;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, info};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    // Debug output directory
    let output_check = match state.image_store.dir() {
        Some(dir) if dir.is_dir() => HealthCheck {
            status: "ok".to_string(),
            message: format!("Saving images to {}", dir.display()),
        },
        Some(dir) => {
            overall_status = HealthStatus::Degraded;
            HealthCheck {
                status: "warning".to_string(),
                message: format!("Output directory {} is missing", dir.display()),
            }
        }
        None => HealthCheck {
            status: "ok".to_string(),
            message: "Image persistence disabled".to_string(),
        },
    };
    checks.insert("output_dir".to_string(), output_check);

    // Configuration
    let config_check = HealthCheck {
        status: "ok".to_string(),
        message: format!(
            "API base: {} (design={}, chat={})",
            state.config.gemini.api_base_url,
            state.config.gemini.design_model,
            state.config.gemini.chat_model
        ),
    };
    checks.insert("configuration".to_string(), config_check);

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Handler for `/metrics` (Prometheus text format)
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

/// Handler for `POST /generate-circuit`
///
/// Malformed or oversized bodies are rejected with 400 / 413. Everything after
/// that, upstream failures included, answers 200. Both carry a `CircuitResponse`.
pub async fn generate_circuit_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>, // Raw bytes first, for better error messages
) -> Result<Json<CircuitResponse>, RelayError> {
    let body = body.map_err(|rejection| {
        error!("Failed to read request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::PayloadTooLarge(rejection.body_text())
        } else {
            RelayError::InvalidRequest(rejection.body_text())
        }
    })?;

    let req: CircuitRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("Failed to deserialize request: {}", e);
        RelayError::InvalidRequest(format!("JSON deserialization error: {}", e))
    })?;

    info!(
        "/generate-circuit mode={:?} prompt_len={} has_image={} has_mask={}",
        req.mode,
        req.prompt.len(),
        req.has_current_image(),
        req.has_painted_image()
    );

    Ok(Json(generate_circuit(&state, req).await))
}

async fn generate_circuit(state: &AppState, req: CircuitRequest) -> CircuitResponse {
    let start = Instant::now();

    // 1. Normalize caller images and build the Gemini request (raster decoding)
    let (prepared, req) = match prepare(state, req).await {
        Ok(prepared) => prepared,
        Err(e) => {
            metrics::record_request("unknown", e.kind(), start.elapsed().as_secs_f64());
            error!("Request preparation failed: {}", e);
            return CircuitResponse::failure(e.user_message());
        }
    };
    let path = prepared.path;
    debug!("Resolved generation path {} -> {}", path, prepared.model);

    // 2. Call Gemini, then 3. decode the response parts
    let result = match state
        .generator
        .generate_content(&req.api_key, &prepared.model, prepared.request)
        .await
    {
        Ok(gemini_resp) => translate_response(gemini_resp, path, state.image_store.as_ref()),
        Err(e) => Err(e),
    };

    let elapsed = start.elapsed().as_secs_f64();
    match result {
        Ok(response) => {
            metrics::record_request(path.as_str(), "success", elapsed);
            info!(
                "Completed {} request in {:.2}s (image={})",
                path,
                elapsed,
                response.image_url.is_some()
            );
            response
        }
        Err(e) => {
            metrics::record_request(path.as_str(), e.kind(), elapsed);
            error!("{} request failed: {}", path, e);
            CircuitResponse::failure(e.user_message())
        }
    }
}

/// Run `build_request` on the blocking pool; decoding large rasters is CPU bound.
async fn prepare(
    state: &AppState,
    req: CircuitRequest,
) -> Result<(PreparedRequest, CircuitRequest), RelayError> {
    let config = state.config.clone();
    let store = state.image_store.clone();

    tokio::task::spawn_blocking(move || {
        let prepared = build_request(&req, &config.gemini, store.as_ref());
        (prepared, req)
    })
    .await
    .map_err(|e| RelayError::Internal(format!("Request builder task failed: {}", e)))
}
