//! # edital-inference
//!
//! Generative model access for the edital analysis pipeline.
//!
//! This crate provides:
//! - The Gemini REST backend implementing [`GenerationBackend`]
//! - Provider failure classification (overloaded, rate limited, misconfigured)
//! - The generation executor: ordered model fallback with bounded,
//!   linearly backed-off retries per model
//! - The analysis response normalizer with single-slot diagnostic dumps
//! - Environment-driven configuration
//!
//! # Feature Flags
//!
//! - `mock`: Enable the scripted [`mock::MockGenerationBackend`]
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use edital_inference::{GeminiBackend, GenerationExecutor, InferenceConfig};
//!
//! # async fn run(request: edital_core::GenerationRequest) -> edital_core::Result<()> {
//! let config = InferenceConfig::from_env()?;
//! let backend = Arc::new(GeminiBackend::new(config.gemini.clone())?);
//! let executor = GenerationExecutor::new(backend, config.backoff());
//! let outcome = executor.call(&config.plan()?, &request).await?;
//! println!("{} answered: {}", outcome.model, outcome.response.text);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod executor;
pub mod gemini;
pub mod normalizer;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use edital_core::*;

pub use classify::{classify, FailureKind};
pub use config::{ConfigError, InferenceConfig};
pub use executor::{
    AttemptOutcome, AttemptRecord, BackoffPolicy, ExecutionOutcome, GenerationExecutor,
    ModelAttemptPlan,
};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use normalizer::{slice_json_object, strip_code_fences, ResponseNormalizer};
