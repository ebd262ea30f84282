//! Gemini-specific error handling.

use edital_core::Error;

/// Gemini error codes, derived from the HTTP status and the gRPC status name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Key missing, invalid, or without access.
    AuthenticationError,
    /// Per-key quota exhausted.
    RateLimitExceeded,
    /// Model temporarily out of capacity.
    Unavailable,
    /// Unknown model.
    ModelNotFound,
    /// Malformed request.
    InvalidArgument,
    /// Other server error.
    ServerError,
    Unknown,
}

impl GeminiErrorCode {
    pub fn from_response(status: u16, grpc_status: &str) -> Self {
        match (status, grpc_status) {
            (401 | 403, _) | (_, "UNAUTHENTICATED" | "PERMISSION_DENIED") => {
                Self::AuthenticationError
            }
            (429, _) | (_, "RESOURCE_EXHAUSTED") => Self::RateLimitExceeded,
            (503, _) | (_, "UNAVAILABLE") => Self::Unavailable,
            (404, _) | (_, "NOT_FOUND") => Self::ModelNotFound,
            (400, _) | (_, "INVALID_ARGUMENT") => Self::InvalidArgument,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Convert a Gemini error response into an edital `Error`.
///
/// The HTTP status is always preserved so failure classification can key on it.
pub fn to_edital_error(status: u16, code: GeminiErrorCode, message: &str) -> Error {
    let message = match code {
        GeminiErrorCode::AuthenticationError => format!("Authentication failed: {}", message),
        GeminiErrorCode::RateLimitExceeded => format!("Rate limit exceeded: {}", message),
        GeminiErrorCode::Unavailable => format!("Model overloaded: {}", message),
        GeminiErrorCode::ModelNotFound => format!("Model not found: {}", message),
        GeminiErrorCode::InvalidArgument => format!("Invalid request: {}", message),
        GeminiErrorCode::ServerError => format!("Server error: {}", message),
        GeminiErrorCode::Unknown => message.to_string(),
    };
    Error::generation(Some(status), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_503() {
        let code = GeminiErrorCode::from_response(503, "UNAVAILABLE");
        assert_eq!(code, GeminiErrorCode::Unavailable);
    }

    #[test]
    fn test_error_code_from_429() {
        let code = GeminiErrorCode::from_response(429, "RESOURCE_EXHAUSTED");
        assert_eq!(code, GeminiErrorCode::RateLimitExceeded);
    }

    #[test]
    fn test_error_code_from_grpc_status_only() {
        let code = GeminiErrorCode::from_response(500, "UNAVAILABLE");
        assert_eq!(code, GeminiErrorCode::Unavailable);
    }

    #[test]
    fn test_error_code_auth() {
        assert_eq!(
            GeminiErrorCode::from_response(403, "PERMISSION_DENIED"),
            GeminiErrorCode::AuthenticationError
        );
    }

    #[test]
    fn test_error_code_from_404() {
        assert_eq!(
            GeminiErrorCode::from_response(404, "NOT_FOUND"),
            GeminiErrorCode::ModelNotFound
        );
    }

    #[test]
    fn test_error_code_unknown() {
        assert_eq!(GeminiErrorCode::from_response(418, ""), GeminiErrorCode::Unknown);
    }

    #[test]
    fn test_to_edital_error_keeps_status() {
        let err = to_edital_error(503, GeminiErrorCode::Unavailable, "The model is overloaded.");
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("Model overloaded"));
    }
}
