//! ChatRepository trait definition.
//!
//! Provides CRUD operations for chats and their messages. Follows the same
//! RPITIT pattern as UserRepository. Mutations that touch more than one
//! statement (append, reset, delete) must be atomic in implementations.

use chrono::{DateTime, Utc};
use parley_types::chat::{Chat, ChatMessage, MessageRole};
use parley_types::error::RepositoryError;
use parley_types::user::UserId;
use uuid::Uuid;

/// Repository trait for chat and message persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Insert a new chat.
    fn create_chat(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Get a chat by ID, scoped to its owner. Another user's chat is `None`.
    fn get_chat(
        &self,
        user_id: UserId,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Whether `chat_id` exists and belongs to `user_id`.
    fn chat_exists(
        &self,
        user_id: UserId,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// All chats of a user, ordered by last_active DESC.
    fn list_chats(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, RepositoryError>> + Send;

    /// Insert a message and bump the chat's last_active in one transaction.
    fn append_message(
        &self,
        chat_id: &Uuid,
        role: MessageRole,
        content: &str,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<ChatMessage, RepositoryError>> + Send;

    /// Messages of a chat, ordered by (created_at, id) ASC.
    fn get_messages(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Set the title, truncated to 30 characters.
    fn update_title(
        &self,
        chat_id: &Uuid,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Bump last_active.
    fn touch(
        &self,
        chat_id: &Uuid,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete all messages, restore the default title and bump last_active.
    /// The chat row and its ID are kept.
    fn reset_chat(
        &self,
        chat_id: &Uuid,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a chat and its messages.
    fn delete_chat(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
