//! Tenant-file authorization.
//!
//! Uploaded files are not always registered as document rows (a bidding
//! process may reference them only through its raw link field), so ownership
//! is established by any one of several independent proofs:
//!
//! 1. [`DocumentRecordProof`]: a document of the tenant stores a URL containing the name.
//! 2. [`TenantPrefixProof`]: the name carries the `<tenantId>_` upload prefix.
//! 3. [`BiddingLinkProof`]: the name appears in the link list of a bidding
//!    process already confirmed to belong to the tenant.
//!
//! Proofs run in order and short-circuit on the first success. A proof that
//! errors counts as not holding; with no proof holding the file is rejected.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use edital_core::{BiddingProcessRecord, DocumentRepository, FileReference, Result};

/// Request-level facts the caller has already verified.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationContext<'a> {
    /// Bidding process loaded under the requesting tenant's scope.
    pub bidding_process: Option<&'a BiddingProcessRecord>,
}

/// One independent way of proving a file belongs to a tenant.
#[async_trait]
pub trait OwnershipProof: Send + Sync {
    fn name(&self) -> &'static str;

    async fn holds(
        &self,
        file: &FileReference,
        tenant_id: Uuid,
        context: &AuthorizationContext<'_>,
    ) -> Result<bool>;
}

/// A registered document of the tenant references the file.
pub struct DocumentRecordProof {
    documents: Arc<dyn DocumentRepository>,
}

impl DocumentRecordProof {
    pub fn new(documents: Arc<dyn DocumentRepository>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl OwnershipProof for DocumentRecordProof {
    fn name(&self) -> &'static str {
        "document_record"
    }

    async fn holds(
        &self,
        file: &FileReference,
        tenant_id: Uuid,
        _context: &AuthorizationContext<'_>,
    ) -> Result<bool> {
        // Stored URLs usually keep the percent-encoded name.
        for fragment in file.url_forms() {
            let record = self
                .documents
                .find_by_url_fragment(&fragment, tenant_id)
                .await?;
            if record.is_some_and(|doc| doc.tenant_id == tenant_id) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// The file was stored under the tenant's upload prefix.
pub struct TenantPrefixProof;

#[async_trait]
impl OwnershipProof for TenantPrefixProof {
    fn name(&self) -> &'static str {
        "tenant_prefix"
    }

    async fn holds(
        &self,
        file: &FileReference,
        tenant_id: Uuid,
        _context: &AuthorizationContext<'_>,
    ) -> Result<bool> {
        Ok(file.has_tenant_prefix(tenant_id))
    }
}

/// The tenant's bidding process links to the file.
pub struct BiddingLinkProof;

#[async_trait]
impl OwnershipProof for BiddingLinkProof {
    fn name(&self) -> &'static str {
        "bidding_link"
    }

    async fn holds(
        &self,
        file: &FileReference,
        tenant_id: Uuid,
        context: &AuthorizationContext<'_>,
    ) -> Result<bool> {
        let Some(process) = context.bidding_process else {
            return Ok(false);
        };
        if process.tenant_id != tenant_id {
            return Ok(false);
        }
        Ok(process.link.as_deref().is_some_and(|link| file.appears_in(link)))
    }
}

/// OR-combination of ownership proofs, failing closed.
pub struct TenantFileAuthorizer {
    proofs: Vec<Box<dyn OwnershipProof>>,
}

impl TenantFileAuthorizer {
    pub fn new(proofs: Vec<Box<dyn OwnershipProof>>) -> Self {
        Self { proofs }
    }

    /// The three standard proofs in their usual order.
    pub fn standard(documents: Arc<dyn DocumentRepository>) -> Self {
        Self::new(vec![
            Box::new(DocumentRecordProof::new(documents)),
            Box::new(TenantPrefixProof),
            Box::new(BiddingLinkProof),
        ])
    }

    pub async fn is_authorized(
        &self,
        file: &FileReference,
        tenant_id: Uuid,
        context: &AuthorizationContext<'_>,
    ) -> bool {
        for proof in &self.proofs {
            match proof.holds(file, tenant_id, context).await {
                Ok(true) => {
                    debug!(
                        subsystem = "api",
                        component = "authorizer",
                        file_name = %file,
                        tenant_id = %tenant_id,
                        proof = proof.name(),
                        "File authorized"
                    );
                    return true;
                }
                Ok(false) => {
                    trace!(file_name = %file, proof = proof.name(), "Proof does not hold");
                }
                Err(e) => {
                    warn!(
                        subsystem = "api",
                        component = "authorizer",
                        file_name = %file,
                        proof = proof.name(),
                        error = %e,
                        "Ownership proof failed, treating as not held"
                    );
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edital_core::{DocumentRecord, Error};

    struct Documents(Vec<DocumentRecord>);

    #[async_trait]
    impl DocumentRepository for Documents {
        async fn find_by_url_fragment(
            &self,
            fragment: &str,
            tenant_id: Uuid,
        ) -> Result<Option<DocumentRecord>> {
            Ok(self
                .0
                .iter()
                .find(|d| d.tenant_id == tenant_id && d.url.contains(fragment))
                .cloned())
        }
    }

    struct Broken;

    #[async_trait]
    impl DocumentRepository for Broken {
        async fn find_by_url_fragment(&self, _: &str, _: Uuid) -> Result<Option<DocumentRecord>> {
            Err(Error::Internal("connection reset".into()))
        }
    }

    fn file(name: &str) -> FileReference {
        FileReference::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_document_record_proof() {
        let tenant = Uuid::new_v4();
        let docs = Documents(vec![DocumentRecord {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            url: "/uploads/contrato_social.pdf".into(),
        }]);
        let authorizer = TenantFileAuthorizer::standard(Arc::new(docs));
        let ctx = AuthorizationContext::default();

        assert!(authorizer.is_authorized(&file("contrato_social.pdf"), tenant, &ctx).await);
        assert!(!authorizer.is_authorized(&file("outro.pdf"), tenant, &ctx).await);
        assert!(
            !authorizer
                .is_authorized(&file("contrato_social.pdf"), Uuid::new_v4(), &ctx)
                .await
        );
    }

    #[tokio::test]
    async fn test_prefix_proof() {
        let tenant = Uuid::new_v4();
        let authorizer = TenantFileAuthorizer::standard(Arc::new(Documents(vec![])));
        let name = file(&format!("{}_0192_edital.pdf", tenant));
        let ctx = AuthorizationContext::default();

        assert!(authorizer.is_authorized(&name, tenant, &ctx).await);
        assert!(!authorizer.is_authorized(&name, Uuid::new_v4(), &ctx).await);
    }

    #[tokio::test]
    async fn test_link_proof_requires_owning_tenant() {
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let process = BiddingProcessRecord {
            id: Uuid::new_v4(),
            tenant_id: owner,
            link: Some("https://portal.gov.br/edital_77.pdf,/uploads/anexo_i.pdf".into()),
        };
        let authorizer = TenantFileAuthorizer::standard(Arc::new(Documents(vec![])));
        let ctx = AuthorizationContext {
            bidding_process: Some(&process),
        };

        assert!(authorizer.is_authorized(&file("anexo_i.pdf"), owner, &ctx).await);
        assert!(!authorizer.is_authorized(&file("anexo_i.pdf"), intruder, &ctx).await);
        assert!(!authorizer.is_authorized(&file("anexo_ii.pdf"), owner, &ctx).await);
    }

    #[tokio::test]
    async fn test_link_proof_matches_encoded_link() {
        let owner = Uuid::new_v4();
        let process = BiddingProcessRecord {
            id: Uuid::new_v4(),
            tenant_id: owner,
            link: Some("https://app.example.com/uploads/edital%20final.pdf".into()),
        };
        let authorizer = TenantFileAuthorizer::standard(Arc::new(Documents(vec![])));
        let ctx = AuthorizationContext {
            bidding_process: Some(&process),
        };

        assert!(authorizer.is_authorized(&file("edital final.pdf"), owner, &ctx).await);
        assert!(!authorizer.is_authorized(&file("edital.pdf"), owner, &ctx).await);
    }

    #[tokio::test]
    async fn test_document_record_proof_matches_encoded_url() {
        let tenant = Uuid::new_v4();
        let docs = Documents(vec![DocumentRecord {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            url: "https://app.example.com/uploads/certid%C3%A3o%20negativa.pdf".into(),
        }]);
        let authorizer = TenantFileAuthorizer::standard(Arc::new(docs));
        let ctx = AuthorizationContext::default();

        assert!(
            authorizer
                .is_authorized(&file("certidão negativa.pdf"), tenant, &ctx)
                .await
        );
        assert!(
            !authorizer
                .is_authorized(&file("certidão negativa.pdf"), Uuid::new_v4(), &ctx)
                .await
        );
    }

    #[tokio::test]
    async fn test_failing_proof_does_not_block_others() {
        let tenant = Uuid::new_v4();
        let authorizer = TenantFileAuthorizer::standard(Arc::new(Broken));
        let ctx = AuthorizationContext::default();

        assert!(
            authorizer
                .is_authorized(&file(&format!("{}_x.pdf", tenant)), tenant, &ctx)
                .await
        );
        assert!(!authorizer.is_authorized(&file("x.pdf"), tenant, &ctx).await);
    }

    #[tokio::test]
    async fn test_no_proofs_fails_closed() {
        let authorizer = TenantFileAuthorizer::new(vec![]);
        let tenant = Uuid::new_v4();
        assert!(
            !authorizer
                .is_authorized(
                    &file(&format!("{}_x.pdf", tenant)),
                    tenant,
                    &AuthorizationContext::default()
                )
                .await
        );
    }
}
