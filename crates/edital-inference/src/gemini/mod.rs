//! Gemini `generateContent` backend.
//!
//! Speaks the Generative Language REST API directly: one POST per attempt to
//! `{base_url}/models/{model}:generateContent`, authenticated with the
//! `x-goog-api-key` header. Files travel inline as base64 `inlineData`
//! parts next to the text parts of the same turn.
//!
//! # Example
//!
//! ```rust,no_run
//! use edital_inference::gemini::{GeminiBackend, GeminiConfig};
//! use edital_core::{ConversationTurn, GenerationBackend, GenerationOptions, GenerationRequest};
//!
//! # async fn run() -> edital_core::Result<()> {
//! let backend = GeminiBackend::new(GeminiConfig {
//!     api_key: Some("secret".to_string()),
//!     ..Default::default()
//! })?;
//! let request = GenerationRequest {
//!     contents: vec![ConversationTurn::user_text("Olá")],
//!     options: GenerationOptions::default(),
//! };
//! let response = backend.generate("gemini-2.5-flash", &request).await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{GeminiBackend, GeminiConfig};
pub use error::{to_edital_error, GeminiErrorCode};
pub use types::*;
