//! Chat and message types for Parley.
//!
//! A chat is a titled conversation thread owned by one user. Messages are
//! append-only turns ordered by creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Title given to new and reset chats.
pub const DEFAULT_CHAT_TITLE: &str = "Untitled";

/// Maximum title length, in characters.
pub const MAX_TITLE_CHARS: usize = 30;

/// Numeric message identifier (SQLite autoincrement, tiebreaker for ordering).
pub type MessageId = i64;

/// Truncate a title to [`MAX_TITLE_CHARS`] characters.
///
/// Counts `char`s, not bytes, so multi-byte text is never split mid-codepoint.
pub fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}

/// A conversation thread owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Opaque token; also used in URLs (`/switch_chat/{id}`).
    pub id: Uuid,
    pub user_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Bumped on every message or switch; chats are listed by this, newest first.
    pub last_active: DateTime<Utc>,
}

impl Chat {
    /// A fresh, untitled chat for `user_id`.
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: DEFAULT_CHAT_TITLE.to_string(),
            created_at: now,
            last_active: now,
        }
    }
}

/// A single turn within a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub chat_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
