/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use heights_core::{CoreError, MessageResponse};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or empty required field (client-correctable)
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] heights_storage::StorageError),

    /// Only raised by the diagnostic email endpoint; lead notifications never escalate
    #[error("Notification failed: {0}")]
    Notification(#[from] crate::services::NotifierError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ServerError::BadRequest(msg),
            CoreError::NotFound { entity, id } => {
                ServerError::NotFound(format!("{} {}", entity, id))
            }
            CoreError::Duplicate(msg) => ServerError::Conflict(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ServerError::Jwt(ref e) => {
                tracing::warn!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string(), None)
            }
            ServerError::Notification(ref e) => {
                tracing::error!("Notification error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Email send failed".to_string(),
                    Some(e.to_string()),
                )
            }
            ServerError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some(e.to_string()),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some(msg.clone()),
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some("Configuration error".to_string()),
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some(e.to_string()),
                )
            }
            ServerError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some("Password error".to_string()),
                )
            }
        };

        let body = Json(MessageResponse {
            message,
            error: detail,
        });

        (status, body).into_response()
    }
}
