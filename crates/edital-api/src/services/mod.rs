//! Service layer for the analysis pipeline.

pub mod analysis_service;
pub mod authorizer;
pub mod chat_context;
pub mod error_messages;
pub mod prompts;
pub mod resolver;

pub use analysis_service::{
    AnalysisOutcome, AnalysisService, AnalyzeRequest, ChatOutcome, ChatRequest,
};
pub use authorizer::{
    AuthorizationContext, BiddingLinkProof, DocumentRecordProof, OwnershipProof,
    TenantFileAuthorizer, TenantPrefixProof,
};
pub use chat_context::ChatContext;
pub use resolver::{FileReferenceResolver, ResolveRequest, ResolvedContext};
