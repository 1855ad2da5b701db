//! Configuration data structures for circuit-relay.
//!
//! This module defines the schema for the application settings: the HTTP
//! server, the upstream Gemini API, logging, and debug image output.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, CORS).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Debug image persistence settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `0.0.0.0`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8000`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed to call the API.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Maximum accepted request body, base64 images included.
    /// Default: 50 MiB
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Settings for the upstream Gemini API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for the public Gemini REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Image-capable model used for schematic generation.
    /// Default: `gemini-2.5-flash-image-preview`
    #[serde(default = "default_image_model")]
    pub design_model: String,

    /// Model used for mask-guided edits.
    /// Default: `gemini-2.5-flash-image-preview`
    #[serde(default = "default_image_model")]
    pub edit_model: String,

    /// Text model used for chat answers.
    /// Default: `gemini-2.5-flash`
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Request timeout in seconds.
    /// Default: `300` (5 minutes)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to mask API keys in logged upstream payloads.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub sanitize_tokens: bool,
}

/// Where decoded input and output images are written for debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Preferred output directory, created on startup.
    /// Default: `generated_images`
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Used when `dir` cannot be created. Falls back to the OS temp dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_dir: Option<String>,

    /// Turn debug persistence on or off.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub save_images: bool,
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            design_model: default_image_model(),
            edit_model: default_image_model(),
            chat_model: default_chat_model(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            sanitize_tokens: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            fallback_dir: None,
            save_images: true,
        }
    }
}

// Helper functions for serde defaults
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
        "https://nano-banana-neon.vercel.app".to_string(),
    ]
}

fn default_max_body_bytes() -> usize {
    // 7MB PNG = ~9.5MB base64, two images per request
    50 * 1024 * 1024
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_chat_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_output_dir() -> String {
    "generated_images".to_string()
}

fn default_true() -> bool {
    true
}
