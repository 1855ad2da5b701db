// Request building (circuit request -> Gemini generateContent)
// Author: kelexine (https://github.com/kelexine)

use crate::config::GeminiConfig;
use crate::models::circuit::{CircuitRequest, GenerationPath, Mode};
use crate::models::gemini::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::models::mapping::map_model;
use crate::vision::models::DecodedRaster;
use crate::vision::normalize::{decode_mask, decode_to_image};
use crate::vision::persist::ImageSink;
use tracing::{debug, warn};

const DESIGN_INSTRUCTION: &str = "Modify or create a professional electronic circuit schematic per the following requirements. \
Include standard symbols, clear labels, component values, and proper wire routing. \
Make it suitable for students and hobbyists to understand and build.\n\n";

const EDIT_INSTRUCTION: &str = "The first image is the current circuit schematic. \
The second image is a transparent overlay: its painted strokes mark the only region you may change. \
Keep everything outside the painted region exactly as it is, including symbols, labels and wiring. \
Redraw the schematic with the following change applied inside the painted region only: ";

const CHAT_CONTEXT: &str =
    "This is the current circuit being discussed. Please reference it in your response if relevant.";

/// A Gemini request ready to send, plus how it was built.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub path: GenerationPath,
    pub model: String,
    pub request: GenerateContentRequest,
}

/// Build the Gemini request for a circuit request.
///
/// Never fails: caller images that do not decode are dropped and the request
/// falls back to a path that does not need them. Decoded caller images are
/// handed to `sink` (`input` and `mask` prefixes).
pub fn build_request(
    req: &CircuitRequest,
    config: &GeminiConfig,
    sink: &dyn ImageSink,
) -> PreparedRequest {
    let (path, parts) = match req.mode {
        Mode::Design => design_parts(req, sink),
        Mode::Chat => (GenerationPath::Chat, chat_parts(req)),
    };

    debug!(
        "Built {} request: {} part(s), {} inline",
        path,
        parts.len(),
        parts.iter().filter(|p| p.is_inline_data()).count()
    );

    let generation_config = path
        .produces_image()
        .then(GenerationConfig::text_and_image);

    PreparedRequest {
        path,
        model: map_model(path, config).to_string(),
        request: GenerateContentRequest {
            contents: vec![Content::user(parts)],
            generation_config,
        },
    }
}

fn design_parts(req: &CircuitRequest, sink: &dyn ImageSink) -> (GenerationPath, Vec<Part>) {
    let base = req
        .has_current_image()
        .then(|| req.current_image.as_deref())
        .flatten()
        .and_then(|encoded| match decode_to_image(encoded) {
            Ok(raster) => Some(raster),
            Err(e) => {
                warn!("Current image unusable, falling back to text-only design: {}", e);
                None
            }
        });

    let Some(base) = base else {
        if req.has_painted_image() {
            warn!("Painted mask supplied without a usable base image, ignoring it");
        }
        return (GenerationPath::Design, vec![Part::text(text_only_design_prompt(&req.prompt))]);
    };
    sink.persist(base.bytes.clone(), "input");

    if let Some(mask) = req.painted_image.as_deref().filter(|_| req.has_painted_image()) {
        match decode_mask(mask) {
            Ok(mask) => {
                sink.persist(mask.bytes.clone(), "mask");
                let parts = vec![
                    inline_part(&base),
                    inline_part(&mask),
                    Part::text(format!("{}{}", EDIT_INSTRUCTION, req.prompt)),
                ];
                return (GenerationPath::SelectiveEdit, parts);
            }
            Err(e) => warn!("Painted mask unusable, doing a plain design update: {}", e),
        }
    }

    // Image first, instruction after
    let parts = vec![
        inline_part(&base),
        Part::text(format!("{}Update this circuit based on: {}", DESIGN_INSTRUCTION, req.prompt)),
    ];
    (GenerationPath::DesignFromImage, parts)
}

fn chat_parts(req: &CircuitRequest) -> Vec<Part> {
    let mut parts = vec![Part::text(chat_prompt(&req.prompt))];

    if let Some(encoded) = req.current_image.as_deref().filter(|_| req.has_current_image()) {
        match decode_to_image(encoded) {
            Ok(raster) => {
                parts.push(inline_part(&raster));
                parts.push(Part::text(CHAT_CONTEXT));
            }
            Err(e) => warn!("Current image unusable, answering without it: {}", e),
        }
    }

    parts
}

fn inline_part(raster: &DecodedRaster) -> Part {
    Part::inline_image(raster.mime.clone(), &raster.bytes)
}

fn text_only_design_prompt(prompt: &str) -> String {
    format!(
        "Create a detailed electronic circuit schematic based on this description: {}\n\n{}",
        prompt, DESIGN_INSTRUCTION
    )
}

fn chat_prompt(prompt: &str) -> String {
    format!(
        "You are an expert electronics engineer and educator. Answer this question about \
electronics, circuits, or related topics: {}\n\n\
Provide helpful, accurate, and educational responses. Include practical tips, component \
recommendations, and safety considerations when relevant.",
        prompt
    )
}
