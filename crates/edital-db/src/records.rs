//! PostgreSQL implementations of the pipeline's record lookups.
//!
//! All three repositories are read-only; rows are written by the CRUD service.

use async_trait::async_trait;
use edital_core::{
    AnalysisRecord, AnalysisRepository, BiddingProcessRecord, BiddingProcessRepository,
    DocumentRecord, DocumentRepository, Error, Result,
};
use sqlx::{Pool, Postgres, Row};
use tracing::trace;
use uuid::Uuid;

use crate::escape_like;

pub struct PgDocumentRepository {
    pool: Pool<Postgres>,
}

impl PgDocumentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn find_by_url_fragment(
        &self,
        fragment: &str,
        tenant_id: Uuid,
    ) -> Result<Option<DocumentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, tenant_id, url
            FROM document
            WHERE tenant_id = $1
              AND url LIKE '%' || $2 || '%' ESCAPE '\'
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(escape_like(fragment))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        trace!(
            subsystem = "db",
            db_table = "document",
            found = row.is_some(),
            "find_by_url_fragment"
        );

        Ok(row.map(|row| DocumentRecord {
            id: row.get("id"),
            tenant_id: row.get("tenant_id"),
            url: row.get("url"),
        }))
    }
}

pub struct PgBiddingProcessRepository {
    pool: Pool<Postgres>,
}

impl PgBiddingProcessRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BiddingProcessRepository for PgBiddingProcessRepository {
    async fn find(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<BiddingProcessRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, tenant_id, link
            FROM bidding_process
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| BiddingProcessRecord {
            id: row.get("id"),
            tenant_id: row.get("tenant_id"),
            link: row.get("link"),
        }))
    }
}

pub struct PgAnalysisRepository {
    pool: Pool<Postgres>,
}

impl PgAnalysisRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisRepository for PgAnalysisRepository {
    async fn find_by_bidding_process(
        &self,
        bidding_process_id: Uuid,
    ) -> Result<Option<AnalysisRecord>> {
        let row = sqlx::query(
            r#"
            SELECT bidding_process_id, source_file_names, full_summary, bidding_items,
                   qualification_requirements, pricing_considerations, penalties,
                   required_documents, deadlines, irregularities_flags, created_at
            FROM ai_analysis
            WHERE bidding_process_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(bidding_process_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| AnalysisRecord {
            bidding_process_id: row.get("bidding_process_id"),
            source_file_names: row.get("source_file_names"),
            full_summary: row.get("full_summary"),
            bidding_items: row.get("bidding_items"),
            qualification_requirements: row.get("qualification_requirements"),
            pricing_considerations: row.get("pricing_considerations"),
            penalties: row.get("penalties"),
            required_documents: row.get("required_documents"),
            deadlines: row.get("deadlines"),
            irregularities_flags: row.get("irregularities_flags"),
            created_at: row.get("created_at"),
        }))
    }
}
