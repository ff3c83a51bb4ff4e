//! Router assembly

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::warn;

use backoffice_shared::constants::{API_PREFIX, TENANT_HEADER};

use crate::handlers::{crud, health, schemas};
use crate::state::AppState;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(TENANT_HEADER),
        ])
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let api_routes = Router::new()
        .route("/schemas", get(schemas::list_schemas))
        .route(
            "/{entity}",
            get(crud::list_records).post(crud::create_record),
        )
        .route(
            "/{entity}/{id}",
            get(crud::get_record)
                .put(crud::update_record)
                .patch(crud::update_record)
                .delete(crud::delete_record),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest(API_PREFIX, api_routes)
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
