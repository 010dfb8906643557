use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("password hashing failed")]
    Hashing,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors related to chat operations and the completion gateway.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("chat not found")]
    NotFound,

    #[error("completion failed: {0}")]
    Upstream(LlmError),

    #[error("request was stopped")]
    Cancelled,

    #[error("storage error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            // The chat vanished underneath the operation (deleted mid-send).
            RepositoryError::NotFound => ChatError::NotFound,
            other => ChatError::Storage(other),
        }
    }
}

impl From<LlmError> for ChatError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Cancelled => ChatError::Cancelled,
            other => ChatError::Upstream(other),
        }
    }
}
