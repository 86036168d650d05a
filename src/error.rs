use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::users::service::AccountError;

#[derive(Debug)]
pub enum AppError {
    InternalServerError,
    BadRequest(String),
    Unauthorized,
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidOperation(msg) | AccountError::InvalidInput(msg) => {
                AppError::BadRequest(msg)
            }
            // Wrong current password; the session itself is valid.
            AccountError::Unauthorized(msg) => AppError::BadRequest(msg),
            AccountError::NotFound(msg) => AppError::NotFound(msg),
            AccountError::Store(e) => {
                tracing::error!("Database error: {:?}", e);
                AppError::InternalServerError
            }
            AccountError::ImageHost(e) => {
                tracing::error!("Image host error: {:?}", e);
                AppError::InternalServerError
            }
            AccountError::Hashing(e) => {
                tracing::error!("Password hashing error: {:?}", e);
                AppError::InternalServerError
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
