// ============================================================================
// Back-office Core - Generic CRUD Controller
// File: crates/backoffice-core/src/services/crud_controller.rs
// ============================================================================
//! Uniform list/get/create/update/delete over one entity schema

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use backoffice_shared::types::Page;

use crate::error::DomainError;
use crate::record::{DeleteResult, Record};
use crate::repositories::EntityStore;
use crate::schema::EntitySchema;
use crate::scoping::{self, Filter};
use crate::tenant::TenantId;

/// CRUD operations for one entity. Payloads are validated before any
/// storage call, and every storage call is tenant scoped.
pub struct CrudController<S: EntityStore + ?Sized> {
    store: Arc<S>,
    schema: &'static EntitySchema,
}

impl<S: EntityStore + ?Sized> Clone for CrudController<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            schema: self.schema,
        }
    }
}

impl<S: EntityStore + ?Sized> CrudController<S> {
    pub fn new(store: Arc<S>, schema: &'static EntitySchema) -> Self {
        Self { store, schema }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Matching records of `tenant` in creation order.
    pub async fn list(
        &self,
        tenant: &TenantId,
        filter: &Filter,
        page: Page,
    ) -> Result<Vec<Record>, DomainError> {
        page.validate()?;
        let filter = self.schema.validate_filter(filter)?;

        let records =
            scoping::find_scoped(self.store.as_ref(), self.schema, &filter, tenant, page).await?;
        debug!(
            "Listed {} {} records for tenant {}",
            records.len(),
            self.schema.name,
            tenant
        );
        Ok(records)
    }

    pub async fn get(&self, tenant: &TenantId, id: &str) -> Result<Record, DomainError> {
        let record_id = self.parse_id(id)?;
        let mut filter = Filter::new();
        filter.insert("id".to_string(), Value::String(record_id.to_string()));

        scoping::find_one_scoped(self.store.as_ref(), self.schema, &filter, tenant)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn create(&self, tenant: &TenantId, payload: &Value) -> Result<Record, DomainError> {
        let data = self.schema.validate_create(payload).map_err(|e| {
            warn!("Rejected {} create for tenant {}: {}", self.schema.name, tenant, e);
            e
        })?;

        let record = scoping::create_scoped(self.store.as_ref(), self.schema, data, tenant).await?;
        info!(
            "Created {} record {} for tenant {}",
            self.schema.name, record.id, tenant
        );
        Ok(record)
    }

    /// Partial merge. `id` and `tenantId` in the payload are ignored.
    pub async fn update(
        &self,
        tenant: &TenantId,
        id: &str,
        payload: &Value,
    ) -> Result<Record, DomainError> {
        let record_id = self.parse_id(id)?;
        let patch = self.schema.validate_patch(payload, Utc::now()).map_err(|e| {
            warn!("Rejected {} update for tenant {}: {}", self.schema.name, tenant, e);
            e
        })?;

        let record =
            scoping::update_scoped(self.store.as_ref(), self.schema, record_id, patch, tenant)
                .await?
                .ok_or_else(|| self.not_found(id))?;
        info!(
            "Updated {} record {} for tenant {}",
            self.schema.name, record.id, tenant
        );
        Ok(record)
    }

    pub async fn delete(&self, tenant: &TenantId, id: &str) -> Result<DeleteResult, DomainError> {
        let record_id = self.parse_id(id)?;
        let deleted =
            scoping::delete_scoped(self.store.as_ref(), self.schema, record_id, tenant).await?;
        if !deleted {
            return Err(self.not_found(id));
        }

        info!(
            "Deleted {} record {} for tenant {}",
            self.schema.name, record_id, tenant
        );
        Ok(DeleteResult {
            id: record_id,
            deleted: true,
        })
    }

    /// A malformed id names no record, so it is reported as not found.
    fn parse_id(&self, id: &str) -> Result<Uuid, DomainError> {
        Uuid::parse_str(id.trim()).map_err(|_| self.not_found(id))
    }

    // Same error for absent and foreign records.
    fn not_found(&self, id: &str) -> DomainError {
        DomainError::NotFound {
            entity: self.schema.name,
            id: id.to_string(),
        }
    }
}
