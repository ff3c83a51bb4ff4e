//! In-process entity store
//!
//! Same contract as the PostgreSQL adapter: insertion order, per-tenant
//! unique indexes and version checks. Used for local runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use backoffice_core::error::DomainError;
use backoffice_core::repositories::EntityStore;
use backoffice_core::schema::EntitySchema;
use backoffice_core::scoping::ScopedFilter;
use backoffice_core::{Record, RecordPatch};
use backoffice_shared::types::Page;

#[derive(Default)]
pub struct MemoryEntityStore {
    // Records per entity, in insertion order.
    collections: RwLock<HashMap<&'static str, Vec<Record>>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records held for `entity` across all tenants.
    pub async fn count(&self, entity: &str) -> usize {
        self.collections
            .read()
            .await
            .get(entity)
            .map_or(0, Vec::len)
    }
}

/// First unique index `candidate` violates against `existing`.
///
/// A missing or null indexed field never conflicts, which mirrors how
/// PostgreSQL treats NULL in a unique index.
fn find_conflict(
    schema: &'static EntitySchema,
    existing: &[Record],
    candidate: &Record,
) -> Option<DomainError> {
    for index in schema.unique {
        let key: Option<Vec<&Value>> = index
            .fields
            .iter()
            .map(|f| candidate.data.get(*f).filter(|v| !v.is_null()))
            .collect();
        let Some(key) = key else {
            continue;
        };

        let taken = existing.iter().any(|other| {
            other.id != candidate.id
                && other.tenant_id == candidate.tenant_id
                && index
                    .fields
                    .iter()
                    .zip(&key)
                    .all(|(f, v)| other.data.get(*f) == Some(*v))
        });
        if taken {
            return Some(DomainError::Conflict {
                entity: schema.name,
                index: index.name.to_string(),
                fields: index.fields.iter().map(|f| f.to_string()).collect(),
            });
        }
    }
    None
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn find(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
        page: Page,
    ) -> Result<Vec<Record>, DomainError> {
        let collections = self.collections.read().await;
        let records = collections
            .get(schema.name)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filter.matches(r))
                    .skip(page.offset as usize)
                    .take(page.limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn find_one(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
    ) -> Result<Option<Record>, DomainError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(schema.name)
            .and_then(|records| records.iter().find(|r| filter.matches(r)).cloned()))
    }

    async fn insert(
        &self,
        schema: &'static EntitySchema,
        record: Record,
    ) -> Result<Record, DomainError> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(schema.name).or_default();

        if records.iter().any(|r| r.id == record.id) {
            return Err(DomainError::Conflict {
                entity: schema.name,
                index: "primary".to_string(),
                fields: vec!["id".to_string()],
            });
        }
        if let Some(conflict) = find_conflict(schema, records, &record) {
            return Err(conflict);
        }

        debug!("Stored {} record {} in memory", schema.name, record.id);
        records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
        patch: RecordPatch,
    ) -> Result<Option<Record>, DomainError> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(schema.name) else {
            return Ok(None);
        };
        let Some(pos) = records.iter().position(|r| filter.matches(r)) else {
            return Ok(None);
        };

        if let Some(expected) = patch.expected_version {
            if records[pos].version != Some(expected) {
                return Err(DomainError::Conflict {
                    entity: schema.name,
                    index: "version".to_string(),
                    fields: vec!["version".to_string()],
                });
            }
        }

        let mut updated = records[pos].clone();
        updated.apply(&patch);
        if let Some(conflict) = find_conflict(schema, records, &updated) {
            return Err(conflict);
        }

        records[pos] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
    ) -> Result<bool, DomainError> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(schema.name) else {
            return Ok(false);
        };
        match records.iter().position(|r| filter.matches(r)) {
            Some(pos) => {
                records.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn close(&self) {}
}
