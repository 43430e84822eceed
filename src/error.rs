/*
 * Responsibility
 * - アプリ共通の AppError 定義 (Unauthenticated / Forbidden / NotFound / Validation / Conflict / Unexpected)
 * - IntoResponse 実装: HTTP status と JSON body を決めるのはここだけ
 * - repo / user service / token のエラーを From で統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::users::UserServiceError;

pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    // The detail is for logs only.
    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn invalid_token() -> Self {
        Self::Unauthenticated("invalid token".into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{resource} not found"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self::Unexpected(detail.into())
    }

    /// Status code and client-facing message for this failure.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Unauthenticated(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            AppError::Unexpected(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MESSAGE.to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Unexpected(detail) = &self {
            tracing::error!(error = %detail, "request failed unexpectedly");
        }

        let (status, message) = self.status_and_message();
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<UserServiceError> for AppError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::NotFound => AppError::not_found("user"),
            UserServiceError::Conflict(message) => AppError::Conflict(message),
            UserServiceError::Validation(message) => AppError::Validation(message),
            UserServiceError::Backend(detail) => AppError::Unexpected(detail),
        }
    }
}
