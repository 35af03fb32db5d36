//! Error types for the Centrum Heights client.

use thiserror::Error;

/// Errors that can occur when talking to the lead API or driving a form.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Required form input is missing; no request was made
    #[error("{0}")]
    Validation(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The operation needs a signed-in session
    #[error("Authentication required")]
    AuthRequired,

    /// Credentials or token rejected by the server
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// IO error while saving a download or session
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Stored session could not be read or written
    #[error("Session error: {0}")]
    Session(String),
}

impl ClientError {
    /// Message the server attached to a rejection, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::ServerError { message, .. } | ClientError::AuthFailed(message)
                if !message.is_empty() =>
            {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
