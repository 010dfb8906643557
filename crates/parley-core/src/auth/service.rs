//! AuthService -- account registration, credential checks, and style
//! preferences.
//!
//! Generic over `UserRepository` and `CredentialHasher` so it can be tested
//! without a database or a real (slow) password hash. Hashing runs on the
//! blocking pool so Argon2 never stalls a runtime worker.

use std::sync::Arc;

use parley_types::error::{AuthError, RepositoryError};
use parley_types::style::Style;
use parley_types::user::{User, UserId};

use super::hasher::CredentialHasher;
use crate::repository::user::UserRepository;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_CHARS: usize = 64;

pub struct AuthService<U: UserRepository, H: CredentialHasher> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U: UserRepository, H: CredentialHasher + 'static> AuthService<U, H> {
    pub fn new(users: Arc<U>, hasher: H) -> Self {
        Self {
            users,
            hasher: Arc::new(hasher),
        }
    }

    async fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password hashing task failed");
                AuthError::Hashing
            })?
    }

    async fn verify_blocking(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let (password, hash) = (password.to_owned(), hash.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "password verification task failed");
                AuthError::Hashing
            })
    }

    /// Create an account with default settings.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::InvalidInput("username is required".into()));
        }
        if username.chars().count() > MAX_USERNAME_CHARS {
            return Err(AuthError::InvalidInput(format!(
                "username must be at most {MAX_USERNAME_CHARS} characters"
            )));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password is required".into()));
        }

        let hash = self.hash_blocking(password).await?;
        match self.users.create_user(username, &hash).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "registered user");
                Ok(user)
            }
            Err(RepositoryError::Conflict(_)) => {
                tracing::debug!(%username, "registration rejected: username taken");
                Err(AuthError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_blocking(password, &user.password_hash).await? {
            tracing::info!(user_id = user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        tracing::info!(user_id = user.id, "user logged in");
        Ok(user)
    }

    pub async fn get_style(&self, user_id: UserId) -> Result<Style, AuthError> {
        Ok(self.users.get_settings(user_id).await?.style)
    }

    /// Parse and store a style. Unknown names are rejected.
    pub async fn change_style(&self, user_id: UserId, style: &str) -> Result<Style, AuthError> {
        let style: Style = style.parse().map_err(AuthError::InvalidInput)?;
        self.users.set_style(user_id, style).await?;
        tracing::info!(user_id, %style, "changed style");
        Ok(style)
    }
}
