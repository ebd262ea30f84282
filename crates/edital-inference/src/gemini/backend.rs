//! Gemini backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use edital_core::{
    defaults, Error, GenerationBackend, GenerationRequest, GenerationResponse, Result,
};

use super::error::{to_edital_error, GeminiErrorCode};
use super::types::*;

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL up to and including the API version.
    pub base_url: String,
    /// API key. Calls fail with a configuration error while unset.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GEMINI_URL.to_string(),
            api_key: None,
            timeout_seconds: defaults::GEN_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| defaults::GEMINI_URL.to_string()),
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            timeout_seconds: std::env::var("GEMINI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::GEN_TIMEOUT_SECS),
        }
    }
}

/// Gemini `generateContent` backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "gemini",
            base_url = %config.base_url,
            api_key_set = config.api_key.is_some(),
            "Initializing Gemini backend"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("Gemini API key is not configured".to_string()))?;

        let body = GenerateContentRequest::from(request);
        let start = Instant::now();
        debug!(
            subsystem = "inference",
            component = "gemini",
            model = model,
            turns = body.contents.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                Error::generation(
                    e.status().map(|s| s.as_u16()),
                    format!("Request failed: {}", e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let (message, grpc_status) = match serde_json::from_str::<GeminiErrorResponse>(&raw) {
                Ok(parsed) => {
                    let grpc = parsed.error.status.unwrap_or_default();
                    let message = if grpc.is_empty() {
                        parsed.error.message
                    } else {
                        format!("{} ({})", parsed.error.message, grpc)
                    };
                    (message, grpc)
                }
                Err(_) if raw.trim().is_empty() => (status.to_string(), String::new()),
                Err(_) => (raw, String::new()),
            };
            let code = GeminiErrorCode::from_response(status.as_u16(), &grpc_status);
            return Err(to_edital_error(status.as_u16(), code, &message));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(None, format!("Failed to parse response: {}", e)))?;

        let text = result.text();
        if text.trim().is_empty() {
            let reason = result
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .or_else(|| result.candidates.first().and_then(|c| c.finish_reason.clone()))
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(Error::generation(
                None,
                format!("Model returned no text ({})", reason),
            ));
        }

        debug!(
            subsystem = "inference",
            component = "gemini",
            model = model,
            response_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generation complete"
        );
        Ok(GenerationResponse { text })
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
