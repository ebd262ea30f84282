//! Centralized default constants for the edital pipeline.
//!
//! Every crate reads its fallbacks from here so that configuration parsing
//! and tests agree on the same values.

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Maximum request body size in bytes (chat histories can be long).
pub const MAX_BODY_SIZE_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// STORAGE
// =============================================================================

/// Shared upload directory holding every tenant's files as flat names.
pub const UPLOAD_DIR: &str = "./uploads";

/// Path segment marking links that point into the local upload namespace.
pub const UPLOAD_URL_SEGMENT: &str = "/uploads/";

/// Single-slot dump of the last unparseable analysis response.
pub const FAILED_JSON_DUMP_FILE: &str = "failed_analysis.json";

/// Append-only pipeline trace log.
pub const TRACE_LOG_FILE: &str = "analysis-trace.log";

/// MIME type assumed when magic-byte detection is inconclusive.
pub const DEFAULT_MIME_TYPE: &str = "application/pdf";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini REST endpoint.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Ordered model plan: a pinned model first, then the moving alias.
pub const GEN_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-flash-latest"];

/// Attempts per model before falling back to the next one.
pub const MAX_RETRIES_PER_MODEL: u32 = 3;

/// Linear backoff step: attempt `n` waits `(n + 1) * step`.
pub const BACKOFF_STEP_MS: u64 = 3_000;

/// Upper bound for any single backoff wait.
pub const BACKOFF_CAP_MS: u64 = 15_000;

/// Timeout for a single generation request in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 300;

/// Sampling temperature for analysis and chat.
pub const GEN_TEMPERATURE: f32 = 0.2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_cap_is_reachable() {
        assert!(BACKOFF_CAP_MS > BACKOFF_STEP_MS);
        assert_eq!(BACKOFF_CAP_MS % BACKOFF_STEP_MS, 0);
    }

    #[test]
    fn test_model_plan_not_empty() {
        assert!(!GEN_MODELS.is_empty());
        assert!(MAX_RETRIES_PER_MODEL > 0);
    }
}
