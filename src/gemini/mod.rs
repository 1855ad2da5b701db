// Gemini API client module
// Author: kelexine (https://github.com/kelexine)

mod client;

pub use client::GeminiClient;

use crate::error::Result;
use crate::models::circuit::ApiKey;
use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;

/// Anything that can answer a `generateContent` call.
///
/// [`GeminiClient`] is the real implementation; the HTTP layer only depends
/// on this trait.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_content(
        &self,
        api_key: &ApiKey,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}
