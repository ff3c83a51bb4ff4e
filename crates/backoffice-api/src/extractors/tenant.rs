//! Tenant context extractor.
//!
//! The `X-Tenant-Id` header is the only source of tenant identity. It is
//! normalized here, once, and handlers only ever see a [`TenantId`].

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use backoffice_core::{DomainError, TenantId};
use backoffice_shared::constants::TENANT_HEADER;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct TenantContext(TenantId);

impl TenantContext {
    pub fn tenant_id(&self) -> &TenantId {
        &self.0
    }
}

fn tenant_from_headers(headers: &HeaderMap) -> Result<TenantId, DomainError> {
    let value = headers
        .get(TENANT_HEADER)
        .ok_or_else(|| DomainError::InvalidTenant("missing X-Tenant-Id header".to_string()))?;
    let raw = value
        .to_str()
        .map_err(|_| DomainError::InvalidTenant("X-Tenant-Id is not valid text".to_string()))?;
    TenantId::parse(raw)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(TenantContext(tenant_from_headers(&parts.headers)?))
    }
}
