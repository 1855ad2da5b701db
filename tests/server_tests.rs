// End-to-end tests for the HTTP surface with a scripted Gemini backend
// Author: kelexine (https://github.com/kelexine)

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::Engine;
use circuit_relay::config::{AppConfig, OutputConfig};
use circuit_relay::error::{RelayError, Result, INVALID_KEY_MESSAGE, QUOTA_MESSAGE};
use circuit_relay::gemini::ContentGenerator;
use circuit_relay::models::circuit::{ApiKey, CircuitResponse, DEFAULT_DESIGN_TEXT};
use circuit_relay::models::gemini::{GenerateContentRequest, GenerateContentResponse, Part};
use circuit_relay::server::create_router;
use circuit_relay::vision::DebugImageStore;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

type Reply = Box<dyn Fn() -> Result<GenerateContentResponse> + Send + Sync>;

/// Records every call and answers with a canned reply.
struct ScriptedGenerator {
    calls: Mutex<Vec<(String, GenerateContentRequest)>>,
    reply: Reply,
}

impl ScriptedGenerator {
    fn new(reply: impl Fn() -> Result<GenerateContentResponse> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        })
    }

    fn replying_json(json: &'static str) -> Arc<Self> {
        Self::new(move || Ok(serde_json::from_str(json).unwrap()))
    }

    fn calls(&self) -> Vec<(String, GenerateContentRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate_content(
        &self,
        _api_key: &ApiKey,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.calls.lock().unwrap().push((model.to_string(), request));
        (self.reply)()
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        output: OutputConfig {
            save_images: false,
            ..OutputConfig::default()
        },
        ..AppConfig::default()
    }
}

fn app_with(config: AppConfig, generator: Arc<ScriptedGenerator>) -> Router {
    let store = DebugImageStore::new(&config.output);
    create_router(config, generator, store).unwrap()
}

fn app(generator: Arc<ScriptedGenerator>) -> Router {
    app_with(test_config(), generator)
}

fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

fn png_data_url() -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes())
    )
}

async fn post_circuit(app: Router, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/generate-circuit")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn generate(app: Router, body: serde_json::Value) -> CircuitResponse {
    let (status, bytes) = post_circuit(app, body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_returns_text_only() {
    let generator = ScriptedGenerator::replying_json(
        r#"{"candidates": [{"content": {"role": "model", "parts": [
            {"text": "A pull-up resistor holds a line high "},
            {"text": "until something drives it low."}
        ]}}]}"#,
    );

    let response = generate(
        app(generator.clone()),
        serde_json::json!({
            "prompt": "What does a pull-up resistor do?",
            "mode": "chat",
            "api_key": "test-key"
        }),
    )
    .await;

    assert!(response.success);
    assert!(response.image_url.is_none());
    assert_eq!(
        response.text.as_deref(),
        Some("A pull-up resistor holds a line high until something drives it low.")
    );

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "gemini-2.5-flash");
    assert!(calls[0].1.generation_config.is_none());
}

#[tokio::test]
async fn test_design_returns_image_data_url() {
    let generator = ScriptedGenerator::new(|| {
        let payload = base64::engine::general_purpose::STANDARD.encode(png_bytes());
        let json = format!(
            r#"{{"candidates": [{{"content": {{"parts": [
                {{"text": "Here is your LED circuit."}},
                {{"inlineData": {{"mimeType": "image/jpeg", "data": "{}"}}}}
            ]}}}}]}}"#,
            payload
        );
        Ok(serde_json::from_str(&json).unwrap())
    });

    let response = generate(
        app(generator.clone()),
        serde_json::json!({"prompt": "LED with resistor", "api_key": "test-key"}),
    )
    .await;

    assert!(response.success);
    assert_eq!(response.text.as_deref(), Some("Here is your LED circuit."));
    let url = response.image_url.unwrap();
    assert!(url.starts_with("data:image/png;base64,"), "sniffed MIME wins: {}", url);

    let calls = generator.calls();
    assert_eq!(calls[0].0, "gemini-2.5-flash-image-preview");
    let modalities = calls[0]
        .1
        .generation_config
        .as_ref()
        .and_then(|c| c.response_modalities.clone())
        .unwrap();
    assert_eq!(modalities, vec!["TEXT", "IMAGE"]);
}

#[tokio::test]
async fn test_design_without_text_gets_placeholder() {
    let generator = ScriptedGenerator::replying_json(
        r#"{"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB"}}
        ]}}]}"#,
    );

    let response = generate(
        app(generator),
        serde_json::json!({"prompt": "555 timer", "api_key": "test-key"}),
    )
    .await;

    assert!(response.success);
    assert_eq!(response.text.as_deref(), Some(DEFAULT_DESIGN_TEXT));
    assert!(response.image_url.is_some());
}

#[tokio::test]
async fn test_selective_edit_sends_two_images_and_instruction() {
    let generator = ScriptedGenerator::replying_json(
        r#"{"candidates": [{"content": {"parts": [{"text": "Edited."}]}}]}"#,
    );

    let response = generate(
        app(generator.clone()),
        serde_json::json!({
            "prompt": "Swap R1 for 10k",
            "current_image": png_data_url(),
            "painted_image": png_data_url(),
            "api_key": "test-key"
        }),
    )
    .await;

    assert!(response.success);

    let calls = generator.calls();
    let parts = &calls[0].1.contents[0].parts;
    assert_eq!(parts.len(), 3);
    assert!(parts[0].is_inline_data());
    assert!(parts[1].is_inline_data());
    assert!(matches!(&parts[2], Part::Text { text, .. } if text.contains("Swap R1 for 10k")));
}

#[tokio::test]
async fn test_undecodable_image_falls_back_to_text_design() {
    let generator = ScriptedGenerator::replying_json(
        r#"{"candidates": [{"content": {"parts": [{"text": "Fresh design."}]}}]}"#,
    );

    let response = generate(
        app(generator.clone()),
        serde_json::json!({
            "prompt": "Buck converter",
            "current_image": "definitely not an image",
            "api_key": "test-key"
        }),
    )
    .await;

    assert!(response.success);
    let calls = generator.calls();
    let parts = &calls[0].1.contents[0].parts;
    assert_eq!(parts.len(), 1);
    assert!(!parts[0].is_inline_data());
}

#[tokio::test]
async fn test_upstream_key_error_is_reported_in_body() {
    let generator = ScriptedGenerator::new(|| {
        Err(RelayError::InvalidCredentials("API key not valid".to_string()))
    });

    let response = generate(
        app(generator),
        serde_json::json!({"prompt": "anything", "mode": "chat", "api_key": "bad"}),
    )
    .await;

    assert!(!response.success);
    assert!(response.text.is_none());
    assert!(response.image_url.is_none());
    assert_eq!(response.error.as_deref(), Some(INVALID_KEY_MESSAGE));
}

#[tokio::test]
async fn test_quota_error_is_reported_in_body() {
    let generator =
        ScriptedGenerator::new(|| Err(RelayError::QuotaExceeded("Resource exhausted".to_string())));

    let response = generate(
        app(generator),
        serde_json::json!({"prompt": "anything", "api_key": "key"}),
    )
    .await;

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some(QUOTA_MESSAGE));
}

#[tokio::test]
async fn test_blocked_prompt_is_a_failure() {
    let generator =
        ScriptedGenerator::replying_json(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);

    let response = generate(
        app(generator),
        serde_json::json!({"prompt": "anything", "api_key": "key"}),
    )
    .await;

    assert!(!response.success);
    assert!(response.error.unwrap().contains("SAFETY"));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let generator = ScriptedGenerator::replying_json(r#"{"candidates": []}"#);

    let (status, _) = post_circuit(app(generator.clone()), "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        post_circuit(app(generator.clone()), r#"{"prompt": "no key"}"#.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_non_utf8_body_gets_canonical_failure() {
    let generator = ScriptedGenerator::replying_json(r#"{"candidates": []}"#);

    let (status, bytes) = post_circuit(app(generator.clone()), vec![b'{', 0xFF, 0xFE, b'}']).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: CircuitResponse = serde_json::from_slice(&bytes).unwrap();
    assert!(!response.success);
    assert!(response.error.is_some());
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_body_gets_canonical_failure() {
    let generator = ScriptedGenerator::replying_json(r#"{"candidates": []}"#);
    let mut config = test_config();
    config.server.max_body_bytes = 64;

    let body = serde_json::json!({"prompt": "x".repeat(200), "api_key": "key"}).to_string();
    let (status, bytes) = post_circuit(app_with(config, generator.clone()), body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let response: CircuitResponse = serde_json::from_slice(&bytes).unwrap();
    assert!(!response.success);
    assert!(response.text.is_none());
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let generator = ScriptedGenerator::replying_json(r#"{"candidates": []}"#);
    let response = app(generator)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["checks"]["configuration"].is_object());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let generator = ScriptedGenerator::replying_json(r#"{"candidates": []}"#);
    let response = app(generator)
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
