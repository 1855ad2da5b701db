// Generation path -> Gemini model mapping
// Author: kelexine (https://github.com/kelexine)

use crate::config::GeminiConfig;
use crate::models::circuit::GenerationPath;

/// Pick the Gemini model for a generation path.
///
/// Both design paths share the image model; mask-guided edits have their own
/// setting so an edit-specialised model can be swapped in.
pub fn map_model(path: GenerationPath, config: &GeminiConfig) -> &str {
    match path {
        GenerationPath::Design | GenerationPath::DesignFromImage => &config.design_model,
        GenerationPath::SelectiveEdit => &config.edit_model,
        GenerationPath::Chat => &config.chat_model,
    }
}
