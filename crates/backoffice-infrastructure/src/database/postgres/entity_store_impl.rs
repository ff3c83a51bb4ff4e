// ============================================================================
// Back-office Infrastructure - PostgreSQL Entity Store
// File: crates/backoffice-infrastructure/src/database/postgres/entity_store_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, info};
use uuid::Uuid;

use backoffice_core::error::DomainError;
use backoffice_core::repositories::EntityStore;
use backoffice_core::schema::EntitySchema;
use backoffice_core::scoping::{IdClause, ScopedFilter};
use backoffice_core::tenant::TenantId;
use backoffice_core::{Record, RecordPatch};
use backoffice_shared::types::Page;

pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct RecordRow {
    pub id: Uuid,
    pub tenant_id: String,
    pub data: Value,
    pub version: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for Record {
    type Error = DomainError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let tenant_id = TenantId::parse(&row.tenant_id)?;
        let data = match row.data {
            Value::Object(map) => map,
            other => {
                return Err(DomainError::DatabaseError(format!(
                    "record {} holds non-object data: {}",
                    row.id, other
                )))
            }
        };
        Ok(Record {
            id: row.id,
            tenant_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
            data,
        })
    }
}

/// Scope predicate shared by every statement: `$1` entity, `$2` tenant,
/// `$3` optional id, `$4` JSONB containment filter.
const SCOPE: &str = "entity = $1 AND tenant_id = $2 AND ($3::uuid IS NULL OR id = $3) AND data @> $4::jsonb";

const RETURNING: &str = "id, tenant_id, data, version, created_at, updated_at";

fn exact_id(filter: &ScopedFilter) -> Option<Uuid> {
    match filter.id() {
        IdClause::Exact(id) => Some(*id),
        _ => None,
    }
}

fn containment(filter: &ScopedFilter) -> Value {
    Value::Object(filter.fields().clone())
}

/// Map a write failure, turning unique violations into `Conflict`.
fn map_write_error(schema: &'static EntitySchema, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            let fields = schema
                .unique_index(&constraint)
                .map(|index| index.fields.iter().map(|f| f.to_string()).collect())
                .unwrap_or_else(|| vec!["id".to_string()]);
            return DomainError::Conflict {
                entity: schema.name,
                index: constraint,
                fields,
            };
        }
    }
    error!("Database error writing {}: {}", schema.name, e);
    DomainError::DatabaseError(e.to_string())
}

fn map_read_error(schema: &'static EntitySchema, e: sqlx::Error) -> DomainError {
    error!("Database error reading {}: {}", schema.name, e);
    DomainError::DatabaseError(e.to_string())
}

fn into_records(rows: Vec<RecordRow>) -> Result<Vec<Record>, DomainError> {
    rows.into_iter().map(Record::try_from).collect()
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn find(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
        page: Page,
    ) -> Result<Vec<Record>, DomainError> {
        if filter.matches_nothing() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM tenant_records WHERE {} ORDER BY seq LIMIT $5 OFFSET $6",
            RETURNING, SCOPE
        );
        let rows: Vec<RecordRow> = sqlx::query_as(&sql)
            .bind(schema.name)
            .bind(filter.tenant_id().as_str())
            .bind(exact_id(filter))
            .bind(containment(filter))
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_error(schema, e))?;

        debug!(
            "Found {} {} rows for tenant {}",
            rows.len(),
            schema.name,
            filter.tenant_id()
        );
        into_records(rows)
    }

    async fn find_one(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
    ) -> Result<Option<Record>, DomainError> {
        if filter.matches_nothing() {
            return Ok(None);
        }

        let sql = format!(
            "SELECT {} FROM tenant_records WHERE {} ORDER BY seq LIMIT 1",
            RETURNING, SCOPE
        );
        let row: Option<RecordRow> = sqlx::query_as(&sql)
            .bind(schema.name)
            .bind(filter.tenant_id().as_str())
            .bind(exact_id(filter))
            .bind(containment(filter))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_error(schema, e))?;

        row.map(Record::try_from).transpose()
    }

    async fn insert(
        &self,
        schema: &'static EntitySchema,
        record: Record,
    ) -> Result<Record, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO tenant_records (
                entity, id, tenant_id, data, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            RETURNING
        );
        let row: RecordRow = sqlx::query_as(&sql)
            .bind(schema.name)
            .bind(record.id)
            .bind(record.tenant_id.as_str())
            .bind(Value::Object(record.data.clone()))
            .bind(record.version)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(schema, e))?;

        info!("Inserted {} row {}", schema.name, row.id);
        row.try_into()
    }

    async fn update(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
        patch: RecordPatch,
    ) -> Result<Option<Record>, DomainError> {
        if filter.matches_nothing() {
            return Ok(None);
        }

        // Single statement: the merge, version check and bump are atomic.
        let sql = format!(
            r#"
            UPDATE tenant_records
            SET
                data = (data || $5::jsonb) - $6::text[],
                updated_at = $7,
                version = CASE WHEN version IS NULL THEN NULL ELSE version + 1 END
            WHERE entity = $1 AND tenant_id = $2
              AND id = (SELECT id FROM tenant_records WHERE {} ORDER BY seq LIMIT 1)
              AND ($8::bigint IS NULL OR version = $8)
            RETURNING {}
            "#,
            SCOPE, RETURNING
        );
        let row: Option<RecordRow> = sqlx::query_as(&sql)
            .bind(schema.name)
            .bind(filter.tenant_id().as_str())
            .bind(exact_id(filter))
            .bind(containment(filter))
            .bind(Value::Object(patch.set.clone()))
            .bind(&patch.unset)
            .bind(patch.updated_at)
            .bind(patch.expected_version)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(schema, e))?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None if patch.expected_version.is_some() => {
                // Distinguish a stale version from a missing record.
                match self.find_one(schema, filter).await? {
                    Some(_) => Err(DomainError::Conflict {
                        entity: schema.name,
                        index: "version".to_string(),
                        fields: vec!["version".to_string()],
                    }),
                    None => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    async fn delete(
        &self,
        schema: &'static EntitySchema,
        filter: &ScopedFilter,
    ) -> Result<bool, DomainError> {
        if filter.matches_nothing() {
            return Ok(false);
        }

        let sql = format!(
            r#"
            DELETE FROM tenant_records
            WHERE entity = $1 AND tenant_id = $2
              AND id = (SELECT id FROM tenant_records WHERE {} ORDER BY seq LIMIT 1)
            "#,
            SCOPE
        );
        let result = sqlx::query(&sql)
            .bind(schema.name)
            .bind(filter.tenant_id().as_str())
            .bind(exact_id(filter))
            .bind(containment(filter))
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(schema, e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }
}
