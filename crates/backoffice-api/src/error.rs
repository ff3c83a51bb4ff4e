//! HTTP error mapping

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use backoffice_core::{DomainError, FieldError, FieldErrors};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    fields: FieldErrors,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn conflict_fields(index: &str, fields: &[String]) -> FieldErrors {
    let mut out = FieldErrors::new();
    for field in fields {
        out.push(FieldError::new(
            field.as_str(),
            "unique",
            format!("{} is already taken (index {})", field, index),
        ));
    }
    out
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, fields) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BadRequest", msg, FieldErrors::new())
            }
            ApiError::Domain(err) => match err {
                DomainError::InvalidTenant(msg) => {
                    tracing::warn!("Invalid tenant: {}", msg);
                    (StatusCode::BAD_REQUEST, "InvalidTenant", msg, FieldErrors::new())
                }
                err @ DomainError::NotFound { .. } => {
                    tracing::warn!("{}", err);
                    (StatusCode::NOT_FOUND, "NotFound", err.to_string(), FieldErrors::new())
                }
                DomainError::UnknownEntity(name) => {
                    tracing::warn!("Unknown entity: {}", name);
                    (
                        StatusCode::NOT_FOUND,
                        "NotFound",
                        format!("unknown entity: {}", name),
                        FieldErrors::new(),
                    )
                }
                DomainError::Validation(errors) => {
                    tracing::warn!("Validation failed: {}", errors);
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "ValidationError",
                        format!("{} field(s) failed validation", errors.len()),
                        errors,
                    )
                }
                DomainError::Conflict {
                    entity,
                    index,
                    fields,
                } => {
                    tracing::warn!("Conflict on {} index {}", entity, index);
                    (
                        StatusCode::CONFLICT,
                        "Conflict",
                        format!("{} record conflicts on {}", entity, index),
                        conflict_fields(&index, &fields),
                    )
                }
                DomainError::DatabaseError(msg) => {
                    tracing::error!("Database error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DatabaseError",
                        "storage failure".to_string(),
                        FieldErrors::new(),
                    )
                }
                DomainError::InternalError(msg) => {
                    tracing::error!("Internal error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "InternalError",
                        "internal server error".to_string(),
                        FieldErrors::new(),
                    )
                }
            },
        };

        let body = Json(ErrorResponse {
            error: error_type,
            message,
            fields,
        });

        (status, body).into_response()
    }
}
