use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::layout::LayoutError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LayoutError> for AppError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::TemplateNotFound(_) => AppError::NotFound(err.to_string()),
            LayoutError::PageIndexOutOfRange { .. }
            | LayoutError::SlotIndexOutOfRange { .. }
            | LayoutError::SlotCapacityExceeded { .. }
            | LayoutError::EmptySlot { .. }
            | LayoutError::PhotoNotAvailable(_)
            | LayoutError::DuplicatePhoto(_)
            | LayoutError::NonFiniteValue { .. }
            | LayoutError::EmptyPhotobook => AppError::UnprocessableEntity(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERIALIZATION_ERROR",
                    "Stored photobook data could not be read".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_errors_map_to_http_status() {
        let cases = [
            (
                LayoutError::TemplateNotFound("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                LayoutError::PageIndexOutOfRange { index: 3, len: 1 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                LayoutError::EmptySlot { page: 0, slot: 0 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                LayoutError::NonFiniteValue { field: "pan_x" },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                LayoutError::PhotoNotAvailable("zzz".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (LayoutError::EmptyPhotobook, StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_conflict_is_409() {
        let response = AppError::Conflict("submitted".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
