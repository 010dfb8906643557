//! User account and per-user settings.

use serde::{Deserialize, Serialize};

use crate::style::Style;

/// Numeric user identifier (SQLite `INTEGER PRIMARY KEY AUTOINCREMENT`).
pub type UserId = i64;

/// A registered account.
///
/// `password_hash` is an Argon2 PHC string and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// Per-user preferences, one row per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: UserId,
    pub style: Style,
}

impl UserSettings {
    /// Settings seeded for a freshly registered user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            style: Style::default(),
        }
    }
}
