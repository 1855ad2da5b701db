// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{generate_circuit_handler, health_handler, metrics_handler};
use super::middleware::{cors_layer, request_id_layers};
use crate::config::AppConfig;
use crate::error::Result;
use crate::gemini::ContentGenerator;
use crate::vision::DebugImageStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generator: Arc<dyn ContentGenerator>,
    pub image_store: Arc<DebugImageStore>,
}

pub fn create_router(
    config: AppConfig,
    generator: Arc<dyn ContentGenerator>,
    image_store: DebugImageStore,
) -> Result<Router> {
    let cors = cors_layer(&config.server.cors_origins);
    let body_limit = config.server.max_body_bytes;

    let state = AppState {
        config: Arc::new(config),
        generator,
        image_store: Arc::new(image_store),
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/generate-circuit", post(generate_circuit_handler))
        // Base64 images make bodies large
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
