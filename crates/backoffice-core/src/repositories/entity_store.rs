//! Entity store trait (port)

use async_trait::async_trait;

use backoffice_shared::types::Page;

use crate::error::DomainError;
use crate::record::{Record, RecordPatch};
use crate::schema::EntitySchema;
use crate::scoping::ScopedFilter;

/// Persistence for tenant-scoped records.
///
/// Reads and writes by filter take a [`ScopedFilter`], so implementations
/// never see an unscoped query. Implementations enforce the schema's unique
/// indexes on insert and update and report violations as
/// [`DomainError::Conflict`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Matching records in creation order.
    async fn find(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
        page: Page,
    ) -> Result<Vec<Record>, DomainError>;

    async fn find_one(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
    ) -> Result<Option<Record>, DomainError>;

    async fn insert(
        &self,
        schema: &'static EntitySchema,
        record: Record,
    ) -> Result<Record, DomainError>;

    /// Merge `patch` into the single matching record and return its new
    /// state, or `None` when nothing matches. A stale
    /// `patch.expected_version` is a `Conflict`.
    async fn update(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
        patch: RecordPatch,
    ) -> Result<Option<Record>, DomainError>;

    /// Returns whether a record was removed.
    async fn delete(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
    ) -> Result<bool, DomainError>;

    async fn ping(&self) -> Result<(), DomainError>;

    /// Release connections. Called once at shutdown.
    async fn close(&self);
}
