//! Inference configuration.
//!
//! Everything is read from environment variables (optionally seeded from a
//! `.env` file by the binary):
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GEMINI_API_KEY` | (none) | Provider credential |
//! | `GEMINI_BASE_URL` | Google v1beta endpoint | API endpoint |
//! | `GEMINI_MODELS` | `gemini-2.5-flash,gemini-flash-latest` | Ordered fallback plan |
//! | `GEMINI_MAX_RETRIES` | 3 | Attempts per model |
//! | `GEMINI_BACKOFF_STEP_MS` | 3000 | Linear backoff step |
//! | `GEMINI_BACKOFF_CAP_MS` | 15000 | Backoff ceiling |
//! | `GEMINI_TIMEOUT` | 300 | Request timeout (seconds) |
//! | `GEMINI_TEMPERATURE` | 0.2 | Sampling temperature |

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use edital_core::defaults;

use crate::executor::{BackoffPolicy, ModelAttemptPlan};
use crate::gemini::GeminiConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for edital_core::Error {
    fn from(e: ConfigError) -> Self {
        edital_core::Error::Config(e.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Inference settings for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub gemini: GeminiConfig,
    /// Ordered model identifiers tried by the executor.
    pub models: Vec<String>,
    pub max_retries_per_model: u32,
    pub backoff_step_ms: u64,
    pub backoff_cap_ms: u64,
    pub temperature: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            models: defaults::GEN_MODELS.iter().map(|m| m.to_string()).collect(),
            max_retries_per_model: defaults::MAX_RETRIES_PER_MODEL,
            backoff_step_ms: defaults::BACKOFF_STEP_MS,
            backoff_cap_ms: defaults::BACKOFF_CAP_MS,
            temperature: defaults::GEN_TEMPERATURE,
        }
    }
}

impl InferenceConfig {
    /// Load from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            config.gemini.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = lookup("GEMINI_BASE_URL") {
            config.gemini.base_url = url;
        }
        if let Some(models) = lookup("GEMINI_MODELS") {
            config.models = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = lookup("GEMINI_MAX_RETRIES") {
            config.max_retries_per_model = parse_var("GEMINI_MAX_RETRIES", &v)?;
        }
        if let Some(v) = lookup("GEMINI_BACKOFF_STEP_MS") {
            config.backoff_step_ms = parse_var("GEMINI_BACKOFF_STEP_MS", &v)?;
        }
        if let Some(v) = lookup("GEMINI_BACKOFF_CAP_MS") {
            config.backoff_cap_ms = parse_var("GEMINI_BACKOFF_CAP_MS", &v)?;
        }
        if let Some(v) = lookup("GEMINI_TIMEOUT") {
            config.gemini.timeout_seconds = parse_var("GEMINI_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("GEMINI_TEMPERATURE") {
            config.temperature = parse_var("GEMINI_TEMPERATURE", &v)?;
        }

        config.validate()?;

        info!(
            subsystem = "inference",
            component = "config",
            models = %config.models.join(","),
            max_retries = config.max_retries_per_model,
            api_key_set = config.gemini.api_key.is_some(),
            "Inference configuration loaded"
        );
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.models.is_empty() {
            return Err(ConfigError::Validation(
                "GEMINI_MODELS must name at least one model".to_string(),
            ));
        }
        if self.max_retries_per_model == 0 {
            return Err(ConfigError::Validation(
                "GEMINI_MAX_RETRIES must be at least 1".to_string(),
            ));
        }
        if self.backoff_cap_ms < self.backoff_step_ms {
            return Err(ConfigError::Validation(format!(
                "backoff cap ({}ms) is below the step ({}ms)",
                self.backoff_cap_ms, self.backoff_step_ms
            )));
        }
        if !self.gemini.base_url.starts_with("http://")
            && !self.gemini.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "GEMINI_BASE_URL must start with http:// or https://, got: {}",
                self.gemini.base_url
            )));
        }
        debug!("Inference configuration validated");
        Ok(())
    }

    pub fn plan(&self) -> edital_core::Result<ModelAttemptPlan> {
        ModelAttemptPlan::new(self.models.iter().cloned(), self.max_retries_per_model)
    }

    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            step: Duration::from_millis(self.backoff_step_ms),
            cap: Duration::from_millis(self.backoff_cap_ms),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}
