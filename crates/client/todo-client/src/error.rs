//! Client error types.

use thiserror::Error;
use todo_core::{ScreenError, ValidationError};
use todo_session::SessionError;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid credentials")]
    Authentication,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unexpected response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Screen(#[from] ScreenError),

    #[error("{0} not found")]
    NotFound(String),
}

impl ClientError {
    /// The single line shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Authentication => "Invalid credentials".to_string(),
            ClientError::Network(_) => "Could not reach the server".to_string(),
            ClientError::Status { status: 401, .. } => {
                "Your session has expired, please log in again".to_string()
            }
            ClientError::Status { status, .. } => format!("Request failed (HTTP {status})"),
            ClientError::Validation(e) => e.to_string(),
            ClientError::Json(_) => "The server sent an unexpected response".to_string(),
            ClientError::InvalidUrl(_) => "The server URL is invalid".to_string(),
            ClientError::Session(_) => "Could not access the saved session".to_string(),
            ClientError::Screen(e) => e.to_string(),
            ClientError::NotFound(what) => format!("{what} not found"),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Authentication | ClientError::Status { status: 401, .. }
        )
    }
}
