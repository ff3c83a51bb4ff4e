//! Table and unique index creation
//!
//! All entities share one JSONB table. Each schema unique index becomes a
//! partial expression index over `tenant_id` and the indexed JSON fields,
//! so uniqueness is always per tenant.

use sqlx::PgPool;
use tracing::{error, info};

use backoffice_core::schema::{EntitySchema, UniqueIndex};
use backoffice_core::{DomainError, SchemaRegistry};

pub const RECORDS_TABLE: &str = "tenant_records";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tenant_records (
    seq         BIGSERIAL   NOT NULL,
    entity      TEXT        NOT NULL,
    id          UUID        NOT NULL,
    tenant_id   TEXT        NOT NULL,
    data        JSONB       NOT NULL DEFAULT '{}'::jsonb,
    version     BIGINT,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (entity, id)
)
"#;

const CREATE_SCOPE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS ix_tenant_records_scope
    ON tenant_records (entity, tenant_id, seq)
"#;

/// Schema and index names are interpolated into DDL, so they must be plain
/// identifiers.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn unique_index_ddl(schema: &EntitySchema, index: &UniqueIndex) -> Result<String, DomainError> {
    let mut names = std::iter::once(schema.name)
        .chain(std::iter::once(index.name))
        .chain(index.fields.iter().copied());
    if let Some(bad) = names.find(|n| !is_identifier(n)) {
        return Err(DomainError::InternalError(format!(
            "{} is not a valid identifier for index DDL",
            bad
        )));
    }

    let columns: Vec<String> = index
        .fields
        .iter()
        .map(|field| format!("(data->>'{}')", field))
        .collect();

    Ok(format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} (tenant_id, {}) WHERE entity = '{}'",
        index.name,
        RECORDS_TABLE,
        columns.join(", "),
        schema.name
    ))
}

async fn execute_ddl(pool: &PgPool, sql: &str) -> Result<(), DomainError> {
    sqlx::query(sql).execute(pool).await.map_err(|e| {
        error!("Migration statement failed: {}", e);
        DomainError::DatabaseError(e.to_string())
    })?;
    Ok(())
}

/// Create the records table and every registered unique index. Idempotent.
pub async fn migrate(pool: &PgPool, registry: &SchemaRegistry) -> Result<(), DomainError> {
    execute_ddl(pool, CREATE_TABLE).await?;
    execute_ddl(pool, CREATE_SCOPE_INDEX).await?;

    for schema in registry.iter() {
        for index in schema.unique {
            execute_ddl(pool, &unique_index_ddl(schema, index)?).await?;
        }
    }

    info!("Storage schema ready for {} entities", registry.len());
    Ok(())
}
