//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use parley_types::error::{AuthError, ChatError};

use super::response::ApiResponse;

/// Non-standard "client closed request" status, used when a send is stopped.
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Client-facing text for 5xx responses. The cause is only logged.
const INTERNAL_MESSAGE: &str = "internal server error";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Auth(AuthError),
    Chat(ChatError),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    /// Status, machine-readable code, and user-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Auth(AuthError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Auth(e @ AuthError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", e.to_string())
            }
            AppError::Auth(e @ AuthError::UsernameTaken(_)) => {
                (StatusCode::CONFLICT, "USERNAME_TAKEN", e.to_string())
            }
            AppError::Auth(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_ERROR",
                INTERNAL_MESSAGE.to_string(),
            ),
            AppError::Chat(e @ ChatError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Chat(e @ ChatError::NotFound) => {
                (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND", e.to_string())
            }
            AppError::Chat(e @ ChatError::Cancelled) => (
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST),
                "REQUEST_CANCELLED",
                e.to_string(),
            ),
            AppError::Chat(e @ ChatError::Upstream(_)) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
            }
            AppError::Chat(ChatError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                INTERNAL_MESSAGE.to_string(),
            ),
        }
    }

    fn cause(&self) -> String {
        match self {
            AppError::Auth(e) => e.to_string(),
            AppError::Chat(e) => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, error = %self.cause(), "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), code, "request rejected");
        }
        (status, ApiResponse::error(code, &message)).into_response()
    }
}
