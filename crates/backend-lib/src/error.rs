// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::Rejection;

/// Message shared by every failed login, whatever the cause
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication error: {0}")]
    Unauthenticated(Rejection),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Details of a server-side failure, attached to the response so the
/// diagnostics middleware can expose them in development mode.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
    pub detail: String,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Token(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::Conflict(_) => "CONFLICT_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::Unauthenticated(_) => "AUTH_002",
            AppError::NotFound(_) => "NF_001",
            AppError::Database(_) => "DB_001",
            AppError::Token(_) => "TOKEN_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get the message that is safe to return to the caller
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Conflict(msg) | AppError::NotFound(msg) => {
                msg.clone()
            },
            AppError::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
            AppError::Unauthenticated(_) => "Not authenticated".to_string(),
            AppError::Database(_) | AppError::Token(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.sanitized_message();

        let mut body = serde_json::json!({
            "error": message,
            "code": code,
        });

        if let AppError::Unauthenticated(reason) = &self {
            tracing::debug!(%reason, "request rejected by session guard");
            body["authenticated"] = serde_json::Value::Bool(false);
        }

        let mut response = (status, Json(body)).into_response();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "request failed");
            response.extensions_mut().insert(ErrorReport {
                code,
                message,
                detail: self.to_string(),
            });
        }

        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}
