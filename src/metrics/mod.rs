// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    REQUESTS_TOTAL,
    REQUEST_DURATION,
    GEMINI_API_CALLS,
    GEMINI_API_DURATION,
    RESPONSE_PARTS,
    PART_DECODE_FAILURES,
    IMAGE_PERSIST,
};

/// Helper to record request metrics
pub fn record_request(path: &str, outcome: &str, duration_secs: f64) {
    REQUESTS_TOTAL.with_label_values(&[path, outcome]).inc();
    REQUEST_DURATION.with_label_values(&[path]).observe(duration_secs);
}

/// Helper to record Gemini API call metrics
pub fn record_gemini_call(model: &str, status_code: u16, duration_secs: f64) {
    GEMINI_API_CALLS
        .with_label_values(&[model, &status_code.to_string()])
        .inc();

    GEMINI_API_DURATION
        .with_label_values(&[model])
        .observe(duration_secs);
}

/// Helper to record a response part by kind
pub fn record_part(kind: &str) {
    RESPONSE_PARTS.with_label_values(&[kind]).inc();
}

pub fn record_part_failure() {
    PART_DECODE_FAILURES.inc();
}

/// Helper to record debug image persistence
pub fn record_persist(result: &str) {
    IMAGE_PERSIST.with_label_values(&[result]).inc();
}
