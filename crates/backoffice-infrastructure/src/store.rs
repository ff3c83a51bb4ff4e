//! Storage backend selection

use std::sync::Arc;

use tracing::info;

use backoffice_core::{DomainError, EntityStore, SchemaRegistry};
use backoffice_shared::config::{AppConfig, StorageBackend};

use crate::database::{create_pool, migrate, MemoryEntityStore, PgEntityStore};

/// Open the configured store. For PostgreSQL this connects the pool and
/// creates the records table plus every registered unique index.
pub async fn open_store(
    config: &AppConfig,
    registry: &SchemaRegistry,
) -> Result<Arc<dyn EntityStore>, DomainError> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory entity store");
            Ok(Arc::new(MemoryEntityStore::new()))
        }
        StorageBackend::Postgres => {
            let url = config.database.url.as_deref().ok_or_else(|| {
                DomainError::InternalError("database.url is required for postgres".to_string())
            })?;

            info!("Connecting to PostgreSQL...");
            let pool = create_pool(url, &config.database)
                .await
                .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
            migrate(&pool, registry).await?;
            info!("PostgreSQL store ready ({} schemas)", registry.len());

            Ok(Arc::new(PgEntityStore::new(pool)))
        }
    }
}
