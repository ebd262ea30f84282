//! edital-api - HTTP API server for edital analysis and chat
//!
//! Routes:
//! - `POST /api/analyze-edital`: structured analysis of edital files
//! - `POST /api/analyze-edital/chat`: chat grounded on the files or a prior analysis
//! - `GET /health`

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod tenant;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use edital_core::{
    defaults, AnalysisRepository, BiddingProcessRepository, DocumentRepository,
    GenerationBackend, Result, StorageBackend,
};
use edital_inference::{GenerationExecutor, ResponseNormalizer};

pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;

use services::{AnalysisService, FileReferenceResolver, TenantFileAuthorizer};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// WIRING
// =============================================================================

/// Collaborators the pipeline reads from.
pub struct Collaborators {
    pub documents: Arc<dyn DocumentRepository>,
    pub bidding_processes: Arc<dyn BiddingProcessRepository>,
    pub analyses: Arc<dyn AnalysisRepository>,
    pub storage: Arc<dyn StorageBackend>,
    pub generation: Arc<dyn GenerationBackend>,
}

/// Build the analysis pipeline from configuration and collaborators.
pub fn build_analysis_service(
    config: &ApiConfig,
    collaborators: Collaborators,
) -> Result<AnalysisService> {
    let authorizer = TenantFileAuthorizer::standard(collaborators.documents);
    let resolver = FileReferenceResolver::new(
        collaborators.bidding_processes,
        collaborators.analyses,
        collaborators.storage,
        authorizer,
        config.upload_url_segment.clone(),
    );
    let executor = GenerationExecutor::new(collaborators.generation, config.inference.backoff());
    Ok(AnalysisService::new(
        resolver,
        executor,
        config.inference.plan()?,
        ResponseNormalizer::new(config.dump_path()),
        config.inference.temperature,
    ))
}

/// The application router with its middleware stack.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/analyze-edital", post(handlers::analyze_edital))
        .route("/api/analyze-edital/chat", post(handlers::chat_edital))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    HeaderName::from_static(tenant::TENANT_HEADER),
                ])
                .allow_credentials(true)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(defaults::MAX_BODY_SIZE_BYTES))
        .with_state(state)
}
