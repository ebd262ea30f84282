//! Core traits for the edital pipeline's collaborators.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// RECORD LOOKUP TRAITS
// =============================================================================

/// Lookup of registered compliance documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Find a document of `tenant_id` whose stored URL contains `fragment`.
    async fn find_by_url_fragment(
        &self,
        fragment: &str,
        tenant_id: Uuid,
    ) -> Result<Option<DocumentRecord>>;
}

/// Lookup of bidding processes.
#[async_trait]
pub trait BiddingProcessRepository: Send + Sync {
    /// Fetch a bidding process, scoped to its owning tenant.
    async fn find(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<BiddingProcessRecord>>;
}

/// Lookup of prior AI analyses.
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Most recent analysis recorded for a bidding process.
    async fn find_by_bidding_process(
        &self,
        bidding_process_id: Uuid,
    ) -> Result<Option<AnalysisRecord>>;
}

// =============================================================================
// STORAGE TRAITS
// =============================================================================

/// Storage backend for uploaded artifacts.
///
/// Allows abstracting over local disk, object stores, or cloud buckets.
/// Locators are opaque to callers; the analysis pipeline only fetches.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store bytes and return the locator they can be fetched with.
    async fn store(&self, data: &[u8], name_hint: &str, tenant_id: Uuid) -> Result<String>;

    /// Read the bytes behind a locator. Fails with `Error::NotFound` when absent.
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>>;

    /// Remove the bytes behind a locator. Absent locators are not an error.
    async fn delete(&self, locator: &str) -> Result<()>;
}

// =============================================================================
// GENERATION TRAITS
// =============================================================================

/// Per-call generation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// System instruction accompanying the conversation.
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
    /// Ask the provider for a specific response MIME type (e.g. JSON).
    pub response_mime_type: Option<String>,
    pub max_output_tokens: Option<u32>,
}

/// Everything sent to the model besides the model identifier.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub contents: Vec<ConversationTurn>,
    pub options: GenerationOptions,
}

/// Text produced by a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
}

/// Backend for generative model calls.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one generation call against `model`.
    ///
    /// Provider failures surface as `Error::Generation` with the HTTP status
    /// when one was received.
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse>;

    /// Name of the provider, for logging.
    fn provider_name(&self) -> &str;
}
