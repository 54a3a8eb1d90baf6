use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Session is not open for reservations")]
    SessionNotBookable,
    #[error("Session has already started")]
    SessionInPast,
    #[error("Session is full")]
    SessionFull,
    #[error("Member already holds a reservation for this session")]
    AlreadyReserved,
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
    #[error("Referenced by other records: {0}")]
    ReferencedEntity(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// Stable machine-readable code, returned alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SessionNotBookable => "SESSION_NOT_BOOKABLE",
            AppError::SessionInPast => "SESSION_IN_PAST",
            AppError::SessionFull => "SESSION_FULL",
            AppError::AlreadyReserved => "ALREADY_RESERVED",
            AppError::InvalidTransition(_) => "INVALID_TRANSITION",
            AppError::ReferencedEntity(_) => "REFERENCED_ENTITY",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION",
            AppError::Database(_) | AppError::InternalWithMsg(_) => "INTERNAL",
        }
    }
}

/// True when the error is a unique-constraint violation on either backend.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)", "code": "CONFLICT" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::SessionNotBookable
            | AppError::SessionInPast
            | AppError::SessionFull
            | AppError::AlreadyReserved => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidTransition(msg) => (StatusCode::CONFLICT, format!("Invalid status transition: {}", msg)),
            AppError::ReferencedEntity(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
