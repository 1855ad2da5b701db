//! Image normalization and response decoding pipeline.
//!
//! This module turns caller images (data URLs or bare base64) into bytes and
//! rasters, classifies image bytes by their magic numbers, and walks Gemini
//! response parts to produce the text and at most one image data URL.
//!
//! # Submodules
//!
//! - `models`: Payload, byte and raster types shared by the pipeline.
//! - `normalize`: Lenient base64 / data-URL decoding and raster decoding.
//! - `sniff`: MIME detection from byte signatures.
//! - `extract`: Response part extraction with the layered payload heuristic.
//! - `persist`: Best-effort debug copies of decoded images.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod extract;
pub mod models;
pub mod normalize;
pub mod persist;
pub mod sniff;

pub use extract::{extract_parts, Extraction, ResponsePart};
pub use models::{DecodeOutcome, Payload, RawImageBytes};
pub use normalize::{decode_mask, decode_to_bytes, decode_to_image, encode_data_url};
pub use persist::{DebugImageStore, DiscardSink, ImageSink};
pub use sniff::sniff;
