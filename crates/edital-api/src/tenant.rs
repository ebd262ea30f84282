//! Tenant identity extractor.
//!
//! The upstream authentication layer forwards the caller's tenant in the
//! `X-Tenant-Id` header.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Tenant the request is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for TenantId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Tenant não identificado".to_string()))?;
        Uuid::parse_str(value.trim())
            .map(TenantId)
            .map_err(|_| ApiError::Unauthorized("Tenant inválido".to_string()))
    }
}
