//! Structured logging and security-focused trace utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing utilities to prevent
//! caller API keys from leaking into logs.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{RelayError, Result};
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static SANITIZE_ENABLED: AtomicBool = AtomicBool::new(true);

static API_KEY_REGEX: OnceLock<Regex> = OnceLock::new();
static BEARER_REGEX: OnceLock<Regex> = OnceLock::new();

fn api_key_regex() -> &'static Regex {
    // Google API keys: "AIza" followed by 35 URL-safe characters
    API_KEY_REGEX.get_or_init(|| Regex::new(r"AIza[0-9A-Za-z_\-]{35}").expect("Invalid regex pattern"))
}

fn bearer_regex() -> &'static Regex {
    BEARER_REGEX.get_or_init(|| Regex::new(r#"(?i)bearer\s+[^\s"']+"#).expect("Invalid regex pattern"))
}

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    SANITIZE_ENABLED.store(config.sanitize_tokens, Ordering::Relaxed);

    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| RelayError::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    result.map_err(|e| RelayError::Internal(format!("Failed to initialize logging: {}", e)))
}

/// Sanitizes sensitive information from log messages.
///
/// Google API keys (`AIza...`) and bearer tokens are replaced with
/// redaction markers. A no-op when `logging.sanitize_tokens` is off.
pub fn sanitize(input: &str) -> String {
    if !SANITIZE_ENABLED.load(Ordering::Relaxed) {
        return input.to_string();
    }
    redact(input)
}

fn redact(input: &str) -> String {
    let result = api_key_regex().replace_all(input, "[REDACTED_API_KEY]");
    bearer_regex()
        .replace_all(&result, "Bearer [REDACTED_TOKEN]")
        .into_owned()
}
