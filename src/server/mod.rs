//! Axum-based HTTP server implementation for circuit-relay.
//!
//! This module is responsible for setting up the HTTP server, configuring routes,
//! and handling incoming circuit generation requests from the web frontend.
//! It bridges these requests to the Google Gemini API.
//!
//! # Components
//!
//! - `handlers`: Implementation of individual endpoints (generate-circuit, health, metrics).
//! - `middleware`: Request ID tracking and CORS.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::{HealthResponse, HealthStatus};
pub use routes::{create_router, AppState};
