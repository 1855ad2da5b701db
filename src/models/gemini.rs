// Gemini public REST API type definitions
// Author: kelexine (https://github.com/kelexine)
// Based on generativelanguage.googleapis.com/v1beta models.generateContent

use crate::vision::extract::ResponsePart;
use crate::vision::models::Payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gemini generate content request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; this service always sends a single user turn.
    pub contents: Vec<Content>,

    /// Generation parameters (response modalities, temperature).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Content in a turn (user or model)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default = "default_role")]
    pub role: String, // "user" or "model"
    #[serde(default)]
    pub parts: Vec<Part>,
}

fn default_role() -> String {
    "model".to_string()
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: "user".to_string(),
            parts,
        }
    }
}

/// Individual part of content in a Gemini request/response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Text content part.
    Text {
        /// The text string.
        text: String,

        /// Set on reasoning traces from thinking models.
        #[serde(skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,

        /// Opaque signature attached to thinking output.
        #[serde(rename = "thoughtSignature", skip_serializing_if = "Option::is_none")]
        thought_signature: Option<String>,
    },

    /// Inline data (images).
    InlineData {
        #[serde(rename = "inlineData", alias = "inline_data")]
        inline_data: InlineData,
    },

    /// Function calls, code execution and anything else we do not use.
    Other(Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            thought: None,
            thought_signature: None,
        }
    }

    /// Inline image part from raw bytes.
    pub fn inline_image(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        use base64::Engine;
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: Payload::Text(base64::engine::general_purpose::STANDARD.encode(bytes)),
            },
        }
    }

    /// Get text content if this is a non-thought Text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, thought, .. } if *thought != Some(true) => Some(text),
            _ => None,
        }
    }

    pub fn is_inline_data(&self) -> bool {
        matches!(self, Part::InlineData { .. })
    }

    /// Reduce to the pipeline's part type.
    ///
    /// Thought traces and unsupported parts yield `None`.
    pub fn into_response_part(self) -> Option<ResponsePart> {
        match self {
            Part::Text { thought: Some(true), .. } => None,
            Part::Text { text, .. } => Some(ResponsePart::Text(text)),
            Part::InlineData { inline_data } => Some(ResponsePart::InlineData {
                payload: inline_data.data,
                claimed_mime: inline_data.mime_type,
            }),
            Part::Other(_) => None,
        }
    }
}

/// Inline binary data. `data` is base64 on the wire, occasionally a byte array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType", alias = "mime_type", default)]
    pub mime_type: String,
    pub data: Payload,
}

/// Generation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// `["TEXT", "IMAGE"]` for image-capable models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationConfig {
    /// Ask for both text and image output.
    pub fn text_and_image() -> Self {
        Self {
            response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            temperature: None,
        }
    }
}

/// Gemini generate content response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, empty when there is none.
    pub fn into_first_parts(self) -> Vec<Part> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }
}

/// Response candidate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Why a prompt was rejected before generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Token usage metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the input prompt.
    #[serde(default)]
    pub prompt_token_count: Option<u32>,

    /// Tokens in the generated response.
    #[serde(default)]
    pub candidates_token_count: Option<u32>,

    /// Total tokens (prompt + candidates).
    #[serde(default)]
    pub total_token_count: Option<u32>,
}
