// Inbound request and canonical response for /generate-circuit
// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Placeholder text for image responses that came back without any text.
pub const DEFAULT_DESIGN_TEXT: &str = "Generated circuit diagram";

/// What the caller wants back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Generate or modify a schematic image.
    #[default]
    Design,
    /// Answer an electronics question in text. Unknown modes land here too.
    #[serde(other)]
    Chat,
}

/// Caller-supplied Gemini API key, passed through opaquely.
///
/// Wiped from memory on drop and never printed.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Body of `POST /generate-circuit`.
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitRequest {
    pub prompt: String,

    /// Current schematic as a data URL or bare base64.
    #[serde(default)]
    pub current_image: Option<String>,

    /// Painted overlay marking the region to edit.
    #[serde(default)]
    pub painted_image: Option<String>,

    #[serde(default)]
    pub mode: Mode,

    pub api_key: ApiKey,
}

impl CircuitRequest {
    pub fn has_current_image(&self) -> bool {
        self.current_image.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    pub fn has_painted_image(&self) -> bool {
        self.painted_image.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Which content layout and model a request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPath {
    /// Text-only schematic generation.
    Design,
    /// Schematic update from the current image.
    DesignFromImage,
    /// Mask-guided edit of the current image.
    SelectiveEdit,
    /// Text answer, image used as context only.
    Chat,
}

impl GenerationPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationPath::Design => "design",
            GenerationPath::DesignFromImage => "design_from_image",
            GenerationPath::SelectiveEdit => "selective_edit",
            GenerationPath::Chat => "chat",
        }
    }

    /// Whether the model is expected to return an image.
    pub fn produces_image(&self) -> bool {
        !matches!(self, GenerationPath::Chat)
    }
}

impl fmt::Display for GenerationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical response returned to the caller.
///
/// Build it with [`CircuitResponse::success`] or [`CircuitResponse::failure`]:
/// a failure never carries an image and a success never carries an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitResponse {
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

impl CircuitResponse {
    pub fn success(text: String, image_url: Option<String>) -> Self {
        Self {
            text: Some(text),
            image_url,
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            text: None,
            image_url: None,
            success: false,
            error: Some(error.into()),
        }
    }
}
