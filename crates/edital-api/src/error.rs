//! HTTP error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::services::error_messages;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    /// Message is already safe to show to the user.
    Internal(String),
}

impl From<edital_core::Error> for ApiError {
    fn from(err: edital_core::Error) -> Self {
        match &err {
            edital_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            edital_core::Error::NoUsableContext(detail) => {
                warn!(subsystem = "api", detail = %detail, "No usable context for request");
                ApiError::BadRequest(error_messages::user_message(&err).to_string())
            }
            _ => {
                error!(subsystem = "api", error = %err, "Pipeline request failed");
                ApiError::Internal(error_messages::user_message(&err).to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
