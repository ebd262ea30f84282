//! Edital analysis and chat pipeline.
//!
//! Both flows resolve files first. Analysis needs at least one loaded file;
//! chat can also run on the textual summary of a prior analysis. Model calls
//! go through the executor (fallback plus retries), and analysis output is
//! normalized into a JSON object.

use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use edital_core::{
    AnalysisPayload, ClientMessage, ContentSegment, ConversationTurn, Error, GenerationOptions,
    GenerationRequest, Result,
};
use edital_inference::{GenerationExecutor, ModelAttemptPlan, ResponseNormalizer};

use super::chat_context;
use super::prompts;
use super::resolver::{FileReferenceResolver, ResolveRequest};

/// Input of an analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeRequest {
    pub file_names: Vec<String>,
    pub bidding_process_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: AnalysisPayload,
    /// Files that were actually sent to the model.
    pub source_file_names: Vec<String>,
    pub model: String,
}

/// Input of a chat turn.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub file_names: Vec<String>,
    pub bidding_process_id: Option<Uuid>,
    pub messages: Vec<ClientMessage>,
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub text: String,
    pub model: String,
    pub used_files: Vec<String>,
    pub used_fallback_context: bool,
}

pub struct AnalysisService {
    resolver: FileReferenceResolver,
    executor: GenerationExecutor,
    plan: ModelAttemptPlan,
    normalizer: ResponseNormalizer,
    temperature: f32,
}

impl AnalysisService {
    pub fn new(
        resolver: FileReferenceResolver,
        executor: GenerationExecutor,
        plan: ModelAttemptPlan,
        normalizer: ResponseNormalizer,
        temperature: f32,
    ) -> Self {
        Self {
            resolver,
            executor,
            plan,
            normalizer,
            temperature,
        }
    }

    pub fn plan(&self) -> &ModelAttemptPlan {
        &self.plan
    }

    /// Run a structured analysis of the edital files.
    pub async fn analyze(
        &self,
        tenant_id: Uuid,
        request: AnalyzeRequest,
    ) -> Result<AnalysisOutcome> {
        let start = Instant::now();
        let has_names = request.file_names.iter().any(|n| !n.trim().is_empty());
        if !has_names && request.bidding_process_id.is_none() {
            return Err(Error::InvalidInput(
                "fileNames must contain at least one file".to_string(),
            ));
        }

        let resolved = self
            .resolver
            .resolve(
                &ResolveRequest {
                    file_names: request.file_names,
                    bidding_process_id: request.bidding_process_id,
                },
                tenant_id,
            )
            .await?;
        if resolved.files.is_empty() {
            return Err(Error::NoUsableContext(format!(
                "no file could be loaded ({} rejected or missing)",
                resolved.rejected_count
            )));
        }

        let source_file_names = resolved.file_names();
        let mut segments: Vec<ContentSegment> =
            resolved.files.into_iter().map(ContentSegment::from).collect();
        segments.push(ContentSegment::text(prompts::ANALYSIS_USER_PROMPT));

        let generation = GenerationRequest {
            contents: vec![ConversationTurn::user(segments)],
            options: GenerationOptions {
                system_instruction: Some(prompts::ANALYSIS_SYSTEM_PROMPT.to_string()),
                temperature: Some(self.temperature),
                response_mime_type: Some("application/json".to_string()),
                max_output_tokens: None,
            },
        };

        let outcome = self.executor.call(&self.plan, &generation).await?;
        let analysis = self.normalizer.normalize(&outcome.response.text).await?;

        info!(
            subsystem = "api",
            component = "analysis",
            op = "analyze",
            tenant_id = %tenant_id,
            model = %outcome.model,
            files = source_file_names.len(),
            attempts = outcome.attempts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Edital analysis completed"
        );

        Ok(AnalysisOutcome {
            analysis,
            source_file_names,
            model: outcome.model,
        })
    }

    /// Answer a chat turn about the edital.
    pub async fn chat(&self, tenant_id: Uuid, request: ChatRequest) -> Result<ChatOutcome> {
        let start = Instant::now();
        let resolved = self
            .resolver
            .resolve(
                &ResolveRequest {
                    file_names: request.file_names,
                    bidding_process_id: request.bidding_process_id,
                },
                tenant_id,
            )
            .await?;

        let fallback_context = resolved
            .analysis
            .as_ref()
            .and_then(|record| record.fallback_context());
        if resolved.files.is_empty() && fallback_context.is_none() {
            return Err(Error::NoUsableContext(format!(
                "no file loaded ({} rejected or missing) and no prior analysis summary",
                resolved.rejected_count
            )));
        }
        if resolved.files.is_empty() {
            warn!(
                subsystem = "api",
                component = "analysis",
                op = "chat",
                tenant_id = %tenant_id,
                "No original files available, answering from prior analysis summary"
            );
        }

        let used_files = resolved.file_names();
        let file_parts: Vec<ContentSegment> =
            resolved.files.into_iter().map(ContentSegment::from).collect();
        let context =
            chat_context::assemble(&request.messages, file_parts, fallback_context.as_deref());

        let generation = GenerationRequest {
            contents: context.contents,
            options: GenerationOptions {
                system_instruction: Some(context.system_instruction),
                temperature: Some(self.temperature),
                response_mime_type: None,
                max_output_tokens: None,
            },
        };
        let outcome = self.executor.call(&self.plan, &generation).await?;

        info!(
            subsystem = "api",
            component = "analysis",
            op = "chat",
            tenant_id = %tenant_id,
            model = %outcome.model,
            files = used_files.len(),
            messages = request.messages.len(),
            response_len = outcome.response.text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat answered"
        );

        Ok(ChatOutcome {
            text: outcome.response.text,
            model: outcome.model,
            used_files,
            used_fallback_context: fallback_context.is_some(),
        })
    }
}
