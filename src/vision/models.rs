// Vision models and types
// Author: kelexine (https://github.com/kelexine)

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Image formats recognised by signature sniffing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
    Svg,
    Heic,
    Heif,
}

impl ImageFormat {
    /// Get MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::Heic => "image/heic",
            ImageFormat::Heif => "image/heif",
        }
    }
}

/// Inline payload as it arrives from the model.
///
/// Most responses carry a base64 string, but some clients serialize the
/// bytes directly as a JSON array. Resolved once here, at the serde boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Payload::Text(s) => s.len(),
            Payload::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decoded image bytes plus the MIME type somebody claimed for them.
///
/// The claim is only a hint; [`super::sniff::sniff`] decides the real type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImageBytes {
    pub bytes: Bytes,
    pub claimed_mime: Option<String>,
}

impl RawImageBytes {
    pub fn new(bytes: impl Into<Bytes>, claimed_mime: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            claimed_mime,
        }
    }
}

/// How an encoded input string was turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The payload was valid base64.
    Decoded,
    /// Base64 decoding failed; the bytes are the literal UTF-8 of the input.
    LiteralFallback,
}

/// Result of [`super::normalize::decode_to_bytes`].
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    pub image: RawImageBytes,
    pub outcome: DecodeOutcome,
}

/// A caller image that decoded as a real raster.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    pub image: image::DynamicImage,
    /// Bytes to forward upstream, matching `mime`.
    pub bytes: Bytes,
    pub mime: String,
}

/// Validation limits
pub const MAX_IMAGE_SIZE_BYTES: usize = 20 * 1024 * 1024; // 20MB (Gemini inline limit)

/// Validate image data size
pub fn validate_image_size(data_len: usize) -> Result<(), String> {
    if data_len > MAX_IMAGE_SIZE_BYTES {
        return Err(format!(
            "Image size {} bytes exceeds maximum of {} bytes (20MB)",
            data_len, MAX_IMAGE_SIZE_BYTES
        ));
    }
    Ok(())
}
