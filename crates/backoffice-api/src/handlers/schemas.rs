use axum::{extract::State, Json};
use serde_json::Value;

use backoffice_core::schema::describe;

use crate::state::AppState;

/// GET /api/v1/schemas
pub async fn list_schemas(State(state): State<AppState>) -> Json<Value> {
    Json(describe(&state.registry))
}
