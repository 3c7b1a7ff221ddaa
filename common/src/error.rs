//! Application-wide error type shared by every service.
//! Client-facing failures (400/401/404/409) carry their message to the response body;
//! everything else collapses into a generic 500 and the detail only goes to the log.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

use crate::auth::TokenError;

/// Message returned to clients for every 5xx.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("password hash error: {0}")]
    PasswordHash(String),
    #[error("repository error: {0}")]
    Repo(String),
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Token(_) | AppError::PasswordHash(_) | AppError::Repo(_) | AppError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message a client is allowed to see.
    pub fn client_message(&self) -> &str {
        match self {
            AppError::Validation(m) | AppError::Unauthorized(m) | AppError::NotFound(m) | AppError::Conflict(m) => m,
            _ => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({ "error": self.client_message() });
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self { AppError::Repo(e.to_string()) }
}
impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self { AppError::Repo(e.to_string()) }
}
impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self { AppError::Token(e.to_string()) }
}
impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self { AppError::Unknown(e.to_string()) }
}
