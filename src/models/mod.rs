//! Data models for the circuit API and the Gemini API.
//!
//! This module contains the type definitions for request/response bodies used by:
//! - The inbound `/generate-circuit` API (`circuit`)
//! - The upstream Google Gemini API (`gemini`)
//! - Generation path to model mapping (`mapping`)

// Author: kelexine (https://github.com/kelexine)

pub mod circuit;
pub mod gemini;
pub mod mapping;

pub use circuit::{ApiKey, CircuitRequest, CircuitResponse, GenerationPath, Mode};
pub use gemini::{Content, GenerateContentRequest, GenerateContentResponse, Part};
pub use mapping::map_model;
