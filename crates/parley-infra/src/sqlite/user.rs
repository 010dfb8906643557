//! SQLite user repository implementation.
//!
//! Implements `UserRepository` from `parley-core`. Registration inserts the
//! user row and its default settings row in one transaction.

use parley_core::repository::user::UserRepository;
use parley_types::error::RepositoryError;
use parley_types::style::Style;
use parley_types::user::{User, UserId, UserSettings};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
        })
    }

    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
        }
    }
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e {
                    if db_err.is_unique_violation() {
                        return RepositoryError::Conflict(format!(
                            "username '{username}' already exists"
                        ));
                    }
                }
                query_err(e)
            })?;
        let id = result.last_insert_rowid();

        sqlx::query("INSERT INTO user_settings (user_id, style) VALUES (?, ?)")
            .bind(id)
            .bind(Style::default().as_str())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;

        Ok(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|r| UserRow::from_row(&r).map(UserRow::into_user))
            .transpose()
            .map_err(query_err)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|r| UserRow::from_row(&r).map(UserRow::into_user))
            .transpose()
            .map_err(query_err)
    }

    async fn get_settings(&self, user_id: UserId) -> Result<UserSettings, RepositoryError> {
        let style: Option<String> =
            sqlx::query_scalar("SELECT style FROM user_settings WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(query_err)?;

        let style = match style {
            Some(s) => s.parse().map_err(RepositoryError::Query)?,
            None => Style::default(),
        };
        Ok(UserSettings { user_id, style })
    }

    async fn set_style(&self, user_id: UserId, style: Style) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_settings (user_id, style) VALUES (?, ?)
             ON CONFLICT (user_id) DO UPDATE SET style = excluded.style",
        )
        .bind(user_id)
        .bind(style.as_str())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_pool() -> (DatabasePool, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        (DatabasePool::new(&url).await.unwrap(), dir)
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let (pool, _dir) = test_pool().await;
        let repo = SqliteUserRepository::new(pool);
        let user = repo.create_user("alice", "$argon2id$fake").await.unwrap();
        assert!(user.id > 0);

        let by_name = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_name.password_hash, "$argon2id$fake");

        let by_id = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        assert!(repo.get_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts_without_second_row() {
        let (pool, _dir) = test_pool().await;
        let repo = SqliteUserRepository::new(pool.clone());
        repo.create_user("alice", "h1").await.unwrap();

        let err = repo.create_user("alice", "h2").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        let (settings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_settings")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(users, 1);
        assert_eq!(settings, 1);
    }

    #[tokio::test]
    async fn test_settings_seeded_and_updated() {
        let (pool, _dir) = test_pool().await;
        let repo = SqliteUserRepository::new(pool);
        let user = repo.create_user("alice", "h").await.unwrap();
        assert_eq!(repo.get_settings(user.id).await.unwrap().style, Style::Sassy);

        repo.set_style(user.id, Style::Friendly).await.unwrap();
        assert_eq!(
            repo.get_settings(user.id).await.unwrap().style,
            Style::Friendly
        );
    }

    #[tokio::test]
    async fn test_missing_settings_default_to_sassy() {
        let (pool, _dir) = test_pool().await;
        let repo = SqliteUserRepository::new(pool.clone());
        let user = repo.create_user("alice", "h").await.unwrap();
        sqlx::query("DELETE FROM user_settings")
            .execute(&pool.writer)
            .await
            .unwrap();

        assert_eq!(repo.get_settings(user.id).await.unwrap().style, Style::Sassy);
        repo.set_style(user.id, Style::Formal).await.unwrap();
        assert_eq!(repo.get_settings(user.id).await.unwrap().style, Style::Formal);
    }
}
