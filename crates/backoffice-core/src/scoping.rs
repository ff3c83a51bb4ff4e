//! # Tenant scoping
//!
//! Every path to storage goes through here. [`EntityStore`] only accepts a
//! [`ScopedFilter`], and the only way to build one is [`scope_filter`], so
//! a query without a tenant clause cannot be expressed.

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use backoffice_shared::types::Page;

use crate::error::DomainError;
use crate::record::{is_system_field, Document, Record, RecordPatch};
use crate::repositories::EntityStore;
use crate::schema::EntitySchema;
use crate::tenant::{IntoTenantId, TenantId};

/// Caller-supplied equality clauses, keyed by field name.
pub type Filter = Document;

/// How a scoped filter constrains the record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdClause {
    Any,
    Exact(Uuid),
    /// The caller asked for an id that cannot exist.
    Impossible,
}

/// A filter that is guaranteed to carry a tenant equality clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedFilter {
    tenant_id: TenantId,
    id: IdClause,
    fields: Document,
}

impl ScopedFilter {
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn id(&self) -> &IdClause {
        &self.id
    }

    /// Field equality clauses, without `id` and `tenantId`.
    pub fn fields(&self) -> &Document {
        &self.fields
    }

    pub fn matches_nothing(&self) -> bool {
        self.id == IdClause::Impossible
    }

    pub fn matches(&self, record: &Record) -> bool {
        if record.tenant_id != self.tenant_id {
            return false;
        }
        match self.id {
            IdClause::Any => {}
            IdClause::Exact(id) if id == record.id => {}
            _ => return false,
        }
        self.fields
            .iter()
            .all(|(key, value)| record.data.get(key) == Some(value))
    }
}

/// Narrow `filter` to one tenant.
///
/// The input is left untouched. A caller-supplied `tenantId` key is
/// replaced by the enforced clause; an `id` key becomes the id clause.
pub fn scope_filter(filter: &Filter, tenant: impl IntoTenantId) -> Result<ScopedFilter, DomainError> {
    let tenant_id = tenant.into_tenant_id()?;

    let mut fields = Document::new();
    let mut id = IdClause::Any;
    for (key, value) in filter {
        match key.as_str() {
            "tenantId" => {}
            "id" => {
                id = value
                    .as_str()
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .map_or(IdClause::Impossible, IdClause::Exact);
            }
            _ => {
                fields.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(ScopedFilter {
        tenant_id,
        id,
        fields,
    })
}

fn id_filter(id: Uuid) -> Filter {
    let mut filter = Filter::new();
    filter.insert("id".to_string(), Value::String(id.to_string()));
    filter
}

pub async fn find_scoped<S>(
    store: &S,
    schema: &'static EntitySchema,
    filter: &Filter,
    tenant: impl IntoTenantId,
    page: Page,
) -> Result<Vec<Record>, DomainError>
where
    S: EntityStore + ?Sized,
{
    let scoped = scope_filter(filter, tenant)?;
    if scoped.matches_nothing() {
        return Ok(Vec::new());
    }
    store.find(schema, &scoped, page).await
}

pub async fn find_one_scoped<S>(
    store: &S,
    schema: &'static EntitySchema,
    filter: &Filter,
    tenant: impl IntoTenantId,
) -> Result<Option<Record>, DomainError>
where
    S: EntityStore + ?Sized,
{
    let scoped = scope_filter(filter, tenant)?;
    if scoped.matches_nothing() {
        return Ok(None);
    }
    store.find_one(schema, &scoped).await
}

/// Insert `data` as a new record owned by `tenant`. Any `tenantId` (or
/// other system field) inside `data` is discarded.
pub async fn create_scoped<S>(
    store: &S,
    schema: &'static EntitySchema,
    mut data: Document,
    tenant: impl IntoTenantId,
) -> Result<Record, DomainError>
where
    S: EntityStore + ?Sized,
{
    let tenant_id = tenant.into_tenant_id()?;
    data.retain(|key, _| !is_system_field(key));
    let record = Record::new(tenant_id, data, schema.versioned);
    debug!(
        "Inserting {} record {} for tenant {}",
        schema.name, record.id, record.tenant_id
    );
    store.insert(schema, record).await
}

pub async fn update_scoped<S>(
    store: &S,
    schema: &'static EntitySchema,
    id: Uuid,
    patch: RecordPatch,
    tenant: impl IntoTenantId,
) -> Result<Option<Record>, DomainError>
where
    S: EntityStore + ?Sized,
{
    let scoped = scope_filter(&id_filter(id), tenant)?;
    store.update(schema, &scoped, patch).await
}

pub async fn delete_scoped<S>(
    store: &S,
    schema: &'static EntitySchema,
    id: Uuid,
    tenant: impl IntoTenantId,
) -> Result<bool, DomainError>
where
    S: EntityStore + ?Sized,
{
    let scoped = scope_filter(&id_filter(id), tenant)?;
    store.delete(schema, &scoped).await
}
