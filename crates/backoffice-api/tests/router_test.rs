//! Router tests over the in-memory store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use tower::ServiceExt;

use backoffice_api::{build_router, AppState};
use backoffice_core::{
    DomainError, EntitySchema, EntityStore, Record, RecordPatch, SchemaRegistry, ScopedFilter,
};
use backoffice_infrastructure::MemoryEntityStore;
use backoffice_shared::types::Page;

fn app() -> Router {
    let state = AppState::new(
        SchemaRegistry::builtin().unwrap(),
        Arc::new(MemoryEntityStore::new()),
    );
    build_router(state, &["http://localhost:5173".to_string()])
}

/// A store whose backing database is unreachable.
struct DownStore;

fn unreachable_db() -> DomainError {
    DomainError::DatabaseError("connection refused".to_string())
}

#[async_trait]
impl EntityStore for DownStore {
    async fn find(
        &self,
        _schema: &'static EntitySchema,
        _filter: &ScopedFilter,
        _page: Page,
    ) -> Result<Vec<Record>, DomainError> {
        Err(unreachable_db())
    }

    async fn find_one(
        &self,
        _schema: &'static EntitySchema,
        _filter: &ScopedFilter,
    ) -> Result<Option<Record>, DomainError> {
        Err(unreachable_db())
    }

    async fn insert(
        &self,
        _schema: &'static EntitySchema,
        _record: Record,
    ) -> Result<Record, DomainError> {
        Err(unreachable_db())
    }

    async fn update(
        &self,
        _schema: &'static EntitySchema,
        _filter: &ScopedFilter,
        _patch: RecordPatch,
    ) -> Result<Option<Record>, DomainError> {
        Err(unreachable_db())
    }

    async fn delete(
        &self,
        _schema: &'static EntitySchema,
        _filter: &ScopedFilter,
    ) -> Result<bool, DomainError> {
        Err(unreachable_db())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Err(unreachable_db())
    }

    async fn close(&self) {}
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    tenant: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(tenant) = tenant {
        builder = builder.header("x-tenant-id", tenant);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_tenant_isolation_over_http() {
    let app = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/tax_rates",
        Some("A1"),
        Some(json!({"type": "Standard", "ratePercent": 18})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["tenantId"], "A1");
    assert_eq!(created["ratePercent"], 18);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, Method::GET, "/api/v1/tax_rates", Some("A2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (_, listed) = send(&app, Method::GET, "/api/v1/tax_rates", Some("A1"), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/tax_rates/{}", id);
    let (status, body) = send(&app, Method::GET, &uri, Some("A2"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &uri,
        Some("A2"),
        Some(json!({"ratePercent": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some("A2"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_lifecycle() {
    let app = app();

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/v1/controls",
        Some("acme"),
        Some(json!({
            "code": "CTL-001",
            "title": "Monthly bank reconciliation",
            "frequency": "Monthly",
            "owner": "controller@acme.example",
        })),
    )
    .await;
    let uri = format!("/api/v1/controls/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some("acme"),
        Some(json!({"title": "Bank reconciliation", "tenantId": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Bank reconciliation");
    assert_eq!(updated["tenantId"], "acme");
    assert_eq!(updated["id"], created["id"]);

    let (status, fetched) = send(&app, Method::GET, &uri, Some("acme"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (status, deleted) = send(&app, Method::DELETE, &uri, Some("acme"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"id": created["id"], "deleted": true}));

    let (status, _) = send(&app, Method::GET, &uri, Some("acme"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/tax_rates", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidTenant");

    let (status, body) = send(&app, Method::GET, "/api/v1/payroll", Some("A1"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "unknown entity: payroll");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/tax_rates",
        Some("A1"),
        Some(json!({"type": "Luxury", "ratePercent": 140, "colour": "red"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let codes: Vec<(&str, &str)> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| (f["field"].as_str().unwrap(), f["code"].as_str().unwrap()))
        .collect();
    assert!(codes.contains(&("type", "choice")));
    assert!(codes.contains(&("ratePercent", "range")));
    assert!(codes.contains(&("colour", "unknown_field")));

    let rate = json!({"type": "Zero", "ratePercent": 0});
    send(&app, Method::POST, "/api/v1/tax_rates", Some("A1"), Some(rate.clone())).await;
    let (status, body) =
        send(&app, Method::POST, "/api/v1/tax_rates", Some("A1"), Some(rate)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["fields"][0]["field"], "type");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/tax_rates?limit=500",
        Some("A1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "limit");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/tax_rates")
        .header("x-tenant-id", "A1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"type\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_from_query() {
    let app = app();
    for (kind, rate) in [("Standard", 18), ("Reduced", 5)] {
        send(
            &app,
            Method::POST,
            "/api/v1/tax_rates",
            Some("A1"),
            Some(json!({"type": kind, "ratePercent": rate})),
        )
        .await;
    }

    let (status, listed) = send(
        &app,
        Method::GET,
        "/api/v1/tax_rates?type=Reduced",
        Some("A1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["ratePercent"], 5);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/tax_rates?colour=red",
        Some("A1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_health_and_schemas() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let (status, body) = send(&app, Method::GET, "/api/v1/schemas", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "tax_rates",
            "eway_bills",
            "itc_matches",
            "forecasts",
            "controls",
            "attachments",
            "tax_provisions"
        ]
    );
}

#[tokio::test]
async fn test_readiness_reports_unreachable_store() {
    let state = AppState::new(SchemaRegistry::builtin().unwrap(), Arc::new(DownStore));
    let app = build_router(state, &[]);

    let (status, body) = send(&app, Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
