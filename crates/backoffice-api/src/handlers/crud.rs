// ============================================================================
// Back-office API - Generic CRUD Handlers
// File: crates/backoffice-api/src/handlers/crud.rs
// ============================================================================
//! One set of handlers serves every registered entity; the entity name in
//! the path selects the schema.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;

use backoffice_core::schema::EntitySchema;
use backoffice_core::{DeleteResult, DomainError, FieldErrors, Filter, Record};
use backoffice_shared::constants::DEFAULT_PAGE_SIZE;
use backoffice_shared::types::Page;

use crate::error::ApiError;
use crate::extractors::TenantContext;
use crate::state::AppState;

type QueryPairs = Vec<(String, String)>;

/// Split list query parameters into paging and field filters.
fn list_params(schema: &EntitySchema, params: &QueryPairs) -> Result<(Page, Filter), DomainError> {
    let mut errors = FieldErrors::new();
    let mut page = Page::new(DEFAULT_PAGE_SIZE, 0);

    for (key, raw) in params {
        let slot = match key.as_str() {
            "limit" => &mut page.limit,
            "offset" => &mut page.offset,
            _ => continue,
        };
        match raw.trim().parse::<u32>() {
            Ok(n) => *slot = n,
            Err(_) => errors.add(
                key.as_str(),
                "type",
                format!("{} must be a non-negative integer", key),
            ),
        }
    }
    errors.into_result()?;

    let filter = schema.filter_from_query(
        params
            .iter()
            .filter(|(key, _)| key != "limit" && key != "offset")
            .map(|(key, raw)| (key.as_str(), raw.as_str())),
    )?;
    Ok((page, filter))
}

/// GET /api/v1/{entity}
pub async fn list_records(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(entity): Path<String>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let controller = state.controller(&entity)?;
    let Query(params) = query?;
    let (page, filter) = list_params(controller.schema(), &params)?;

    let records = controller.list(tenant.tenant_id(), &filter, page).await?;
    Ok(Json(records))
}

/// POST /api/v1/{entity}
pub async fn create_record(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(entity): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let controller = state.controller(&entity)?;
    let Json(payload) = payload?;

    let record = controller.create(tenant.tenant_id(), &payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/{entity}/{id}
pub async fn get_record(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<Record>, ApiError> {
    let controller = state.controller(&entity)?;
    let record = controller.get(tenant.tenant_id(), &id).await?;
    Ok(Json(record))
}

/// PUT / PATCH /api/v1/{entity}/{id}
pub async fn update_record(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path((entity, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Record>, ApiError> {
    let controller = state.controller(&entity)?;
    let Json(payload) = payload?;

    let record = controller.update(tenant.tenant_id(), &id, &payload).await?;
    Ok(Json(record))
}

/// DELETE /api/v1/{entity}/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<DeleteResult>, ApiError> {
    let controller = state.controller(&entity)?;
    let result = controller.delete(tenant.tenant_id(), &id).await?;
    Ok(Json(result))
}
