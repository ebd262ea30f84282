//! File reference resolution.
//!
//! Candidate file names come from three sources, in order:
//!
//! 1. The names sent with the request.
//! 2. The bidding process's comma-joined `link` field, keeping only links
//!    into the local upload namespace or links that embed the tenant id.
//! 3. The `sourceFileNames` of the latest analysis of that process.
//!
//! Candidates are normalized and deduplicated, authorized one by one, and
//! loaded from storage sequentially. Unauthorized or unreadable candidates
//! are skipped and counted; an empty result is left for the caller to judge.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use edital_core::{
    AnalysisRecord, AnalysisRepository, AuthorizedFile, BiddingProcessRecord,
    BiddingProcessRepository, FileReference, Result, StorageBackend,
};

use super::authorizer::{AuthorizationContext, TenantFileAuthorizer};

/// Where a resolution starts from.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub file_names: Vec<String>,
    pub bidding_process_id: Option<Uuid>,
}

/// Loaded files plus the records consulted along the way.
#[derive(Debug, Default)]
pub struct ResolvedContext {
    pub files: Vec<AuthorizedFile>,
    /// Candidates rejected by the authorizer or missing from storage.
    pub rejected_count: usize,
    pub bidding_process: Option<BiddingProcessRecord>,
    pub analysis: Option<AnalysisRecord>,
}

impl ResolvedContext {
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|f| f.reference.as_str().to_string())
            .collect()
    }
}

/// Ordered, deduplicated candidate set.
#[derive(Debug, Default)]
struct Candidates {
    seen: HashSet<FileReference>,
    ordered: Vec<FileReference>,
}

impl Candidates {
    fn push(&mut self, raw: &str) {
        if let Some(reference) = FileReference::parse(raw) {
            if self.seen.insert(reference.clone()) {
                self.ordered.push(reference);
            }
        }
    }

    fn len(&self) -> usize {
        self.ordered.len()
    }
}

pub struct FileReferenceResolver {
    bidding_processes: Arc<dyn BiddingProcessRepository>,
    analyses: Arc<dyn AnalysisRepository>,
    storage: Arc<dyn StorageBackend>,
    authorizer: TenantFileAuthorizer,
    upload_url_segment: String,
}

impl FileReferenceResolver {
    pub fn new(
        bidding_processes: Arc<dyn BiddingProcessRepository>,
        analyses: Arc<dyn AnalysisRepository>,
        storage: Arc<dyn StorageBackend>,
        authorizer: TenantFileAuthorizer,
        upload_url_segment: impl Into<String>,
    ) -> Self {
        Self {
            bidding_processes,
            analyses,
            storage,
            authorizer,
            upload_url_segment: upload_url_segment.into(),
        }
    }

    pub async fn resolve(
        &self,
        request: &ResolveRequest,
        tenant_id: Uuid,
    ) -> Result<ResolvedContext> {
        let start = Instant::now();
        let mut candidates = Candidates::default();
        for name in &request.file_names {
            candidates.push(name);
        }
        let from_request = candidates.len();

        let mut bidding_process = None;
        let mut analysis = None;
        if let Some(process_id) = request.bidding_process_id {
            bidding_process = self.bidding_processes.find(process_id, tenant_id).await?;
            match &bidding_process {
                Some(process) => {
                    for link in process.links() {
                        if !self.is_local_link(link, tenant_id) {
                            continue;
                        }
                        if let Some(name) = file_name_from_link(link) {
                            candidates.push(&name);
                        }
                    }
                    // Only the owner's process exposes its analysis.
                    analysis = self.analyses.find_by_bidding_process(process.id).await?;
                    if let Some(record) = &analysis {
                        for name in record.source_file_names() {
                            candidates.push(&name);
                        }
                    }
                }
                None => {
                    warn!(
                        subsystem = "api",
                        component = "resolver",
                        tenant_id = %tenant_id,
                        bidding_process_id = %process_id,
                        "Bidding process not found for tenant"
                    );
                }
            }
        }

        debug!(
            subsystem = "api",
            component = "resolver",
            from_request,
            total_candidates = candidates.len(),
            has_analysis = analysis.is_some(),
            "Candidate file names collected"
        );

        let context = AuthorizationContext {
            bidding_process: bidding_process.as_ref(),
        };
        let mut files = Vec::new();
        let mut rejected_count = 0;
        for reference in candidates.ordered {
            if !self
                .authorizer
                .is_authorized(&reference, tenant_id, &context)
                .await
            {
                warn!(
                    subsystem = "api",
                    component = "resolver",
                    tenant_id = %tenant_id,
                    file_name = %reference,
                    "File not authorized for tenant, skipping"
                );
                rejected_count += 1;
                continue;
            }

            match self.storage.fetch(reference.as_str()).await {
                Ok(data) => files.push(AuthorizedFile::from_bytes(reference, data)),
                Err(e) => {
                    warn!(
                        subsystem = "api",
                        component = "resolver",
                        file_name = %reference,
                        error = %e,
                        "Authorized file could not be read, skipping"
                    );
                    rejected_count += 1;
                }
            }
        }

        info!(
            subsystem = "api",
            component = "resolver",
            tenant_id = %tenant_id,
            result_count = files.len(),
            rejected_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "File references resolved"
        );

        Ok(ResolvedContext {
            files,
            rejected_count,
            bidding_process,
            analysis,
        })
    }

    fn is_local_link(&self, link: &str, tenant_id: Uuid) -> bool {
        link.contains(&self.upload_url_segment) || link.contains(&tenant_id.to_string())
    }
}

/// Trailing path segment of a link, still percent-encoded.
///
/// Absolute URLs go through the URL parser; relative paths and anything it
/// rejects fall back to splitting on `/` and dropping the query.
pub fn file_name_from_link(link: &str) -> Option<String> {
    let from_url = url::Url::parse(link).ok().and_then(|parsed| {
        let last = parsed.path_segments()?.next_back()?.to_string();
        (!last.is_empty()).then_some(last)
    });
    if from_url.is_some() {
        return from_url;
    }

    let without_query = link.split(|c: char| c == '?' || c == '#').next().unwrap_or(link);
    without_query
        .rsplit('/')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
