//! # edital-db
//!
//! Persistence collaborators for the edital analysis pipeline.
//!
//! This crate provides:
//! - Connection pool management
//! - Read-only PostgreSQL lookups for documents, bidding processes and analyses
//! - A flat, local-disk storage backend for uploaded files
//!
//! The relational schema itself is owned by the CRUD service; this crate only
//! reads the columns the pipeline needs.
//!
//! ## Example
//!
//! ```rust,ignore
//! use edital_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/edital").await?;
//!     let process = db.bidding_processes.find(process_id, tenant_id).await?;
//!     Ok(())
//! }
//! ```

pub mod file_storage;
pub mod pool;
pub mod records;

// Re-export core types
pub use edital_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub use file_storage::{sanitize_name_hint, validate_locator, FilesystemBackend};
pub use pool::{create_pool, PoolConfig};
pub use records::{PgAnalysisRepository, PgBiddingProcessRepository, PgDocumentRepository};

use std::sync::Arc;

/// Combined database context with the pipeline's repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub documents: Arc<PgDocumentRepository>,
    pub bidding_processes: Arc<PgBiddingProcessRepository>,
    pub analyses: Arc<PgAnalysisRepository>,
}

impl Database {
    /// Connect with the pool configuration from the environment.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url, &PoolConfig::from_env()).await?;
        Ok(Self::new(pool))
    }

    /// Build the repositories over an existing pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            documents: Arc::new(PgDocumentRepository::new(pool.clone())),
            bidding_processes: Arc::new(PgBiddingProcessRepository::new(pool.clone())),
            analyses: Arc::new(PgAnalysisRepository::new(pool.clone())),
            pool,
        }
    }
}
