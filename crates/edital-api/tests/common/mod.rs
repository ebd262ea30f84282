//! Shared fixtures: in-memory record stores, a temp upload directory and a
//! scripted generation backend wired into the real router.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use edital_api::{build_analysis_service, router, ApiConfig, AppState, Collaborators};
use edital_core::{
    AnalysisRecord, AnalysisRepository, BiddingProcessRecord, BiddingProcessRepository,
    DocumentRecord, DocumentRepository, Result,
};
use edital_db::FilesystemBackend;
use edital_inference::mock::MockGenerationBackend;

pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF";

#[derive(Default)]
pub struct MemoryDocuments(pub Mutex<Vec<DocumentRecord>>);

#[async_trait]
impl DocumentRepository for MemoryDocuments {
    async fn find_by_url_fragment(
        &self,
        fragment: &str,
        tenant_id: Uuid,
    ) -> Result<Option<DocumentRecord>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.tenant_id == tenant_id && d.url.contains(fragment))
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryProcesses(pub Mutex<Vec<BiddingProcessRecord>>);

#[async_trait]
impl BiddingProcessRepository for MemoryProcesses {
    async fn find(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<BiddingProcessRecord>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id && p.tenant_id == tenant_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryAnalyses(pub Mutex<Vec<AnalysisRecord>>);

#[async_trait]
impl AnalysisRepository for MemoryAnalyses {
    async fn find_by_bidding_process(
        &self,
        bidding_process_id: Uuid,
    ) -> Result<Option<AnalysisRecord>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|a| a.bidding_process_id == bidding_process_id)
            .cloned())
    }
}

/// Everything a test needs to arrange data and inspect calls.
pub struct TestApp {
    pub router: Router,
    pub tenant: Uuid,
    pub upload_dir: TempDir,
    pub documents: Arc<MemoryDocuments>,
    pub processes: Arc<MemoryProcesses>,
    pub analyses: Arc<MemoryAnalyses>,
    pub generation: MockGenerationBackend,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_generation(MockGenerationBackend::new())
    }

    pub fn with_generation(generation: MockGenerationBackend) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let dir = upload_dir.path().to_string_lossy().to_string();
        let config = ApiConfig::from_lookup(|name| match name {
            "UPLOAD_DIR" => Some(dir.clone()),
            "GEMINI_MODELS" => Some("m1,m2".to_string()),
            "GEMINI_MAX_RETRIES" => Some("2".to_string()),
            "GEMINI_BACKOFF_STEP_MS" => Some("1".to_string()),
            "GEMINI_BACKOFF_CAP_MS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap();

        let documents = Arc::new(MemoryDocuments::default());
        let processes = Arc::new(MemoryProcesses::default());
        let analyses = Arc::new(MemoryAnalyses::default());
        let service = build_analysis_service(
            &config,
            Collaborators {
                documents: documents.clone(),
                bidding_processes: processes.clone(),
                analyses: analyses.clone(),
                storage: Arc::new(FilesystemBackend::new(upload_dir.path())),
                generation: Arc::new(generation.clone()),
            },
        )
        .unwrap();

        Self {
            router: router(AppState::new(service), &config.allowed_origins),
            tenant: Uuid::new_v4(),
            upload_dir,
            documents,
            processes,
            analyses,
            generation,
        }
    }

    /// Write a file into the upload directory.
    pub fn upload(&self, name: &str, data: &[u8]) {
        std::fs::write(self.upload_dir.path().join(name), data).unwrap();
    }

    /// Upload a PDF under the tenant's prefix and return its stored name.
    pub fn upload_owned_pdf(&self, suffix: &str) -> String {
        let name = format!("{}_{}", self.tenant, suffix);
        self.upload(&name, PDF_BYTES);
        name
    }

    pub fn add_process(&self, tenant_id: Uuid, link: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.processes.0.lock().unwrap().push(BiddingProcessRecord {
            id,
            tenant_id,
            link: link.map(String::from),
        });
        id
    }

    pub fn add_analysis(&self, record: AnalysisRecord) {
        self.analyses.0.lock().unwrap().push(record);
    }

    pub async fn post(&self, uri: &str, tenant: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(tenant) = tenant {
            request = request.header("x-tenant-id", tenant);
        }
        let request = request.body(Body::from(body.to_string())).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn post_as_tenant(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let tenant = self.tenant.to_string();
        self.post(uri, Some(&tenant), body).await
    }
}
