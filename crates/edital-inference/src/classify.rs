//! Classification of generation failures.
//!
//! Providers are inconsistent about where the cause of a failure lives: some
//! errors carry an HTTP status, others only a message (SDK-wrapped errors,
//! gRPC-style status names). Classification looks at the status first and
//! falls back to message substrings.

use edital_core::Error;

/// Why a generation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Shared capacity exhausted (503-class). Retryable.
    Overloaded,
    /// Caller exceeded its request rate (429-class). Retryable.
    RateLimited,
    /// The provider credential is absent or rejected.
    MissingApiKey,
    /// The model answered with text no JSON object could be recovered from.
    MalformedResponse,
    /// Anything else: bad request, unknown model, network failure.
    Other,
}

impl FailureKind {
    /// Transient failures worth resubmitting to the same model.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Overloaded | Self::RateLimited)
    }
}

/// Classify an error by status code, then by message content.
pub fn classify(err: &Error) -> FailureKind {
    if let Error::MalformedResponse { .. } = err {
        return FailureKind::MalformedResponse;
    }

    match err.status() {
        Some(503) => return FailureKind::Overloaded,
        Some(429) => return FailureKind::RateLimited,
        _ => {}
    }

    let message = err.to_string();
    let lower = message.to_lowercase();

    if lower.contains("503") || lower.contains("overloaded") || message.contains("UNAVAILABLE") {
        FailureKind::Overloaded
    } else if lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("too many requests")
        || message.contains("RESOURCE_EXHAUSTED")
    {
        FailureKind::RateLimited
    } else if message.contains("API key") {
        FailureKind::MissingApiKey
    } else {
        FailureKind::Other
    }
}
