//! PostgreSQL store tests
//!
//! Need a live database: `DATABASE_URL=postgres://... cargo test -- --ignored`

use std::sync::Arc;

use serde_json::json;

use backoffice_core::domain::{TAX_PROVISIONS, TAX_RATES};
use backoffice_core::{CrudController, DomainError, Filter, SchemaRegistry, TenantId};
use backoffice_infrastructure::{create_pool, migrate, PgEntityStore};
use backoffice_shared::config::DatabaseSettings;
use backoffice_shared::types::Page;

async fn store() -> Arc<PgEntityStore> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let settings = DatabaseSettings {
        url: Some(url.clone()),
        max_connections: 2,
        min_connections: 1,
        acquire_timeout_secs: 5,
    };
    let pool = create_pool(&url, &settings).await.unwrap();
    migrate(&pool, &SchemaRegistry::builtin().unwrap()).await.unwrap();
    Arc::new(PgEntityStore::new(pool))
}

// Fresh tenant per run so reruns don't collide on unique indexes.
fn fresh_tenant() -> TenantId {
    TenantId::from(uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore]
async fn test_pg_scoped_crud() {
    let controller = CrudController::new(store().await, &TAX_RATES);
    let owner = fresh_tenant();
    let other = fresh_tenant();

    let created = controller
        .create(&owner, &json!({"type": "Standard", "ratePercent": 18}))
        .await
        .unwrap();
    let id = created.id.to_string();

    assert!(controller
        .list(&other, &Filter::new(), Page::default())
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        controller.get(&other, &id).await,
        Err(DomainError::NotFound { .. })
    ));

    let updated = controller
        .update(&owner, &id, &json!({"description": "GST 18%"}))
        .await
        .unwrap();
    assert_eq!(updated.field("description"), Some(&json!("GST 18%")));
    assert_eq!(updated.field("ratePercent"), Some(&json!(18)));

    let cleared = controller
        .update(&owner, &id, &json!({"description": null}))
        .await
        .unwrap();
    assert!(cleared.field("description").is_none());

    let duplicate = controller
        .create(&owner, &json!({"type": "Standard", "ratePercent": 12}))
        .await
        .unwrap_err();
    assert!(matches!(
        duplicate,
        DomainError::Conflict { ref index, .. } if index == "ux_tax_rates_type"
    ));

    assert!(controller.delete(&owner, &id).await.unwrap().deleted);
}

#[tokio::test]
#[ignore]
async fn test_pg_version_guard() {
    let controller = CrudController::new(store().await, &TAX_PROVISIONS);
    let tenant = fresh_tenant();

    let created = controller
        .create(
            &tenant,
            &json!({
                "challanNumber": "CH-PG-1",
                "taxType": "TDS",
                "period": "2024-04",
                "provisionAmount": 1200,
            }),
        )
        .await
        .unwrap();
    let id = created.id.to_string();

    let bumped = controller
        .update(&tenant, &id, &json!({"status": "Paid", "version": 1}))
        .await
        .unwrap();
    assert_eq!(bumped.version, Some(2));

    let stale = controller
        .update(&tenant, &id, &json!({"status": "Reversed", "version": 1}))
        .await
        .unwrap_err();
    assert!(matches!(stale, DomainError::Conflict { ref index, .. } if index == "version"));
}
