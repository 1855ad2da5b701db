// Response translation (Gemini -> canonical circuit response)
// Author: kelexine (https://github.com/kelexine)

use crate::error::{RelayError, Result};
use crate::models::circuit::{CircuitResponse, GenerationPath, DEFAULT_DESIGN_TEXT};
use crate::models::gemini::{GenerateContentResponse, Part};
use crate::vision::extract::{extract_parts, ResponsePart};
use crate::vision::persist::ImageSink;
use tracing::{debug, info};

/// Translate a Gemini response into the canonical response.
///
/// Image paths run the full part extractor and default empty text to a
/// placeholder. Chat keeps text only and treats a missing candidate as an error.
pub fn translate_response(
    gemini_resp: GenerateContentResponse,
    path: GenerationPath,
    sink: &dyn ImageSink,
) -> Result<CircuitResponse> {
    if gemini_resp.candidates.is_empty() {
        if let Some(reason) = gemini_resp.block_reason() {
            return Err(RelayError::GeminiApi(format!("Request blocked: {}", reason)));
        }
        if !path.produces_image() {
            return Err(RelayError::Translation("No candidates in Gemini response".to_string()));
        }
    }

    if let Some(usage) = &gemini_resp.usage_metadata {
        debug!(
            "Token usage: prompt={:?} total={:?}",
            usage.prompt_token_count, usage.total_token_count
        );
    }

    let parts = gemini_resp.into_first_parts();
    info!("Model returned {} part(s) in {} mode", parts.len(), path);

    let parts = parts.into_iter().filter_map(Part::into_response_part);

    if !path.produces_image() {
        let text: String = parts
            .filter_map(|part| match part {
                ResponsePart::Text(text) => Some(text),
                ResponsePart::InlineData { .. } => None,
            })
            .collect();
        return Ok(CircuitResponse::success(text, None));
    }

    let extraction = extract_parts(parts, sink);
    debug!(
        "Extracted {} chars of text, {} image(s), {} skipped part(s)",
        extraction.text.len(),
        extraction.images_seen,
        extraction.skipped_parts
    );

    let text = if extraction.text.is_empty() {
        DEFAULT_DESIGN_TEXT.to_string()
    } else {
        extraction.text
    };

    Ok(CircuitResponse::success(text, extraction.image_url))
}
