//! User repository trait definition.

use parley_types::error::RepositoryError;
use parley_types::style::Style;
use parley_types::user::{User, UserId, UserSettings};

/// Repository trait for user and user-settings persistence.
///
/// Implementations live in parley-infra (e.g., SqliteUserRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait UserRepository: Send + Sync {
    /// Create a user and seed its default settings row atomically.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken; no row
    /// is written in that case.
    fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Look up a user by exact username.
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Look up a user by ID.
    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Settings for a user. A missing row yields the defaults.
    fn get_settings(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<UserSettings, RepositoryError>> + Send;

    /// Upsert the user's style.
    fn set_style(
        &self,
        user_id: UserId,
        style: Style,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
