// Response part extraction: text accumulation and inline image decoding
// Author: kelexine (https://github.com/kelexine)

use super::models::Payload;
use super::normalize::{decode_base64_lenient, encode_data_url};
use super::persist::ImageSink;
use super::sniff::{has_image_magic, sniff};
use crate::metrics;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A model response part, reduced to what the pipeline cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Text(String),
    InlineData {
        payload: Payload,
        claimed_mime: String,
    },
}

/// Why an inline part was skipped.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PartDecodeError {
    #[error("payload is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("payload is empty")]
    Empty,
}

/// Which branch of the payload heuristic produced the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Byte payload that was itself base64 of an image.
    DoubleEncoded,
    /// Byte payload used as-is.
    Raw,
    /// String payload decoded from base64.
    Decoded,
}

/// Outcome of walking a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Text parts concatenated in order, untrimmed.
    pub text: String,
    /// Data URL of the last inline image that decoded.
    pub image_url: Option<String>,
    pub images_seen: usize,
    pub skipped_parts: usize,
}

/// Resolve an inline payload to image bytes.
///
/// Ordered heuristic:
/// 1. bytes that base64-decode to something with image magic: the decoded bytes
/// 2. any other bytes: as-is
/// 3. a string: base64-decoded
pub fn resolve_payload(payload: Payload) -> Result<(Bytes, Resolution), PartDecodeError> {
    let (bytes, resolution) = match payload {
        Payload::Bytes(raw) => match decode_base64_lenient(&raw) {
            Ok(decoded) if has_image_magic(&decoded) => (decoded, Resolution::DoubleEncoded),
            _ => (raw, Resolution::Raw),
        },
        Payload::Text(encoded) => {
            let decoded = decode_base64_lenient(encoded.as_bytes())
                .map_err(|e| PartDecodeError::InvalidBase64(e.to_string()))?;
            (decoded, Resolution::Decoded)
        }
    };

    if bytes.is_empty() {
        return Err(PartDecodeError::Empty);
    }
    Ok((Bytes::from(bytes), resolution))
}

/// Walk response parts in order, collecting text and the last inline image.
///
/// A part that cannot be decoded is logged and skipped; it never stops the
/// remaining parts from being processed. Each decoded image is handed to
/// `sink` with the `output` prefix.
pub fn extract_parts<I>(parts: I, sink: &dyn ImageSink) -> Extraction
where
    I: IntoIterator<Item = ResponsePart>,
{
    let mut extraction = Extraction::default();

    for (idx, part) in parts.into_iter().enumerate() {
        match part {
            ResponsePart::Text(text) => {
                debug!("part[{}] type=text len={}", idx, text.len());
                metrics::record_part("text");
                extraction.text.push_str(&text);
            }
            ResponsePart::InlineData {
                payload,
                claimed_mime,
            } => {
                info!(
                    "part[{}] type=inline_data mime={} size={}",
                    idx,
                    claimed_mime,
                    payload.len()
                );
                metrics::record_part("inline_data");

                let (bytes, resolution) = match resolve_payload(payload) {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        warn!("Skipping inline part[{}]: {}", idx, e);
                        metrics::record_part_failure();
                        extraction.skipped_parts += 1;
                        continue;
                    }
                };

                let mime = sniff(&bytes, &claimed_mime);
                debug!(
                    "part[{}] resolved {} bytes via {:?}, sniffed {}",
                    idx,
                    bytes.len(),
                    resolution,
                    mime
                );

                if extraction.image_url.is_some() {
                    debug!("part[{}] replaces the previously extracted image", idx);
                }
                extraction.image_url = Some(encode_data_url(&bytes, &mime));
                extraction.images_seen += 1;

                sink.persist(bytes, "output");
            }
        }
    }

    extraction
}
