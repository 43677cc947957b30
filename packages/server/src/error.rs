use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::shaper::ValidationErrors;

/// Structured error response returned by all endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Invalid fields: title")]
    pub message: String,
    /// Per-field failures, present when the request payload itself was rejected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldErrorBody>,
}

/// A single rejected payload field.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FieldErrorBody {
    #[schema(example = "ingredients")]
    pub field: &'static str,
    /// One of: `required`, `type_mismatch`, `unresolved_reference`,
    /// `read_only`, `invalid`.
    #[schema(example = "unresolved_reference")]
    pub code: &'static str,
    #[schema(example = "Unknown ingredient id(s): [42]")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidFields(ValidationErrors),
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                    fields: Vec::new(),
                },
            ),
            AppError::InvalidFields(errors) => {
                let message = errors.to_string();
                let fields = errors
                    .into_errors()
                    .into_iter()
                    .map(|e| FieldErrorBody {
                        field: e.field,
                        code: e.kind.code(),
                        message: e.kind.to_string(),
                    })
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        code: "VALIDATION_ERROR",
                        message,
                        fields,
                    },
                )
            }
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                    fields: Vec::new(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                        fields: Vec::new(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        tracing::debug!("Rejected payload: {errors}");
        AppError::InvalidFields(errors)
    }
}
