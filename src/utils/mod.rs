//! Utility functions and helpers for circuit-relay.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and API key redaction for log output.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
