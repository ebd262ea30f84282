//! Edital analysis and chat HTTP handlers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use edital_core::{AnalysisPayload, ClientMessage};

use crate::error::ApiError;
use crate::services::{error_messages, AnalyzeRequest, ChatRequest};
use crate::state::AppState;
use crate::tenant::TenantId;

/// Request body for `POST /api/analyze-edital`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeEditalRequest {
    #[serde(default)]
    pub file_names: Vec<String>,
    #[serde(default)]
    pub bidding_process_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeEditalResponse {
    pub analysis: AnalysisPayload,
    pub source_file_names: Vec<String>,
    pub model: String,
}

/// Request body for `POST /api/analyze-edital/chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEditalRequest {
    #[serde(default)]
    pub file_names: Vec<String>,
    #[serde(default)]
    pub bidding_process_id: Option<Uuid>,
    #[serde(default)]
    pub messages: Vec<ClientMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEditalResponse {
    pub text: String,
    pub model: String,
    pub used_files: Vec<String>,
    pub used_fallback_context: bool,
}

/// Analyze edital files with the generative model.
///
/// # Returns
/// - 200 OK with the normalized analysis JSON
/// - 400 Bad Request when no file is given or none can be used
/// - 401 Unauthorized without a tenant
/// - 500 Internal Server Error with a localized message when the AI fails
pub async fn analyze_edital(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<AnalyzeEditalRequest>,
) -> Result<Json<AnalyzeEditalResponse>, ApiError> {
    if body.file_names.iter().all(|n| n.trim().is_empty()) && body.bidding_process_id.is_none() {
        return Err(ApiError::BadRequest(error_messages::NO_FILES.to_string()));
    }

    let outcome = state
        .analysis
        .analyze(
            tenant_id,
            AnalyzeRequest {
                file_names: body.file_names,
                bidding_process_id: body.bidding_process_id,
            },
        )
        .await?;

    Ok(Json(AnalyzeEditalResponse {
        analysis: outcome.analysis,
        source_file_names: outcome.source_file_names,
        model: outcome.model,
    }))
}

/// Chat about an edital, grounded on its files or its prior analysis.
pub async fn chat_edital(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<ChatEditalRequest>,
) -> Result<Json<ChatEditalResponse>, ApiError> {
    let outcome = state
        .analysis
        .chat(
            tenant_id,
            ChatRequest {
                file_names: body.file_names,
                bidding_process_id: body.bidding_process_id,
                messages: body.messages,
            },
        )
        .await?;

    Ok(Json(ChatEditalResponse {
        text: outcome.text,
        model: outcome.model,
        used_files: outcome.used_files,
        used_fallback_context: outcome.used_fallback_context,
    }))
}
