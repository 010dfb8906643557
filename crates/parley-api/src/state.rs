//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the HTTP handlers.
//! Services are generic over repository/hasher traits, but AppState pins them
//! to the concrete infra implementations.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use parley_core::auth::service::AuthService;
use parley_core::chat::cache::ChatListCache;
use parley_core::chat::service::ChatService;
use parley_core::gateway::{CompletionGateway, GatewaySettings};
use parley_core::lifecycle::registry::RequestRegistry;
use parley_core::llm::box_provider::BoxLlmProvider;
use parley_infra::crypto::password::Argon2CredentialHasher;
use parley_infra::sqlite::chat::SqliteChatRepository;
use parley_infra::sqlite::pool::{DatabasePool, database_url_in};
use parley_infra::sqlite::user::SqliteUserRepository;
use parley_types::config::AppConfig;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_cookies::Key;

use crate::http::session::SessionStore;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAuthService = AuthService<SqliteUserRepository, Argon2CredentialHasher>;

pub type ConcreteChatService = ChatService<SqliteChatRepository, SqliteUserRepository>;

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub registry: RequestRegistry,
    pub sessions: SessionStore,
    /// Signs the session cookie.
    pub cookie_key: Key,
}

impl AppState {
    /// Wire services on top of an open, migrated pool. The caller keeps
    /// its own handle to close the pool on shutdown.
    pub fn new(
        db_pool: DatabasePool,
        provider: BoxLlmProvider,
        config: &AppConfig,
        session_secret: &SecretString,
    ) -> Self {
        let user_repo = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let chat_repo = Arc::new(SqliteChatRepository::new(db_pool));

        let gateway = CompletionGateway::new(
            provider,
            GatewaySettings::from_config(&config.llm, &config.chat),
        );
        let cache = ChatListCache::new(Duration::from_secs(config.chat.cache_ttl_secs));

        let auth_service = AuthService::new(user_repo.clone(), Argon2CredentialHasher::new());
        let chat_service = ChatService::new(chat_repo, user_repo, Arc::new(gateway), cache);

        Self {
            auth_service: Arc::new(auth_service),
            chat_service: Arc::new(chat_service),
            registry: RequestRegistry::new(),
            sessions: SessionStore::new(Duration::from_secs(config.server.session_ttl_secs)),
            cookie_key: cookie_key(session_secret),
        }
    }
}

/// Derive the 64-byte cookie signing key from an arbitrary-length secret.
pub fn cookie_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Open the configured database (creating the data directory if needed)
/// and apply migrations.
pub async fn open_database(config: &AppConfig, data_dir: &Path) -> anyhow::Result<DatabasePool> {
    let url = match &config.database.url {
        Some(url) => url.clone(),
        None => {
            tokio::fs::create_dir_all(data_dir)
                .await
                .with_context(|| format!("failed to create {}", data_dir.display()))?;
            database_url_in(data_dir)
        }
    };

    let pool = DatabasePool::connect(&url)
        .await
        .context("failed to open database")?;
    pool.migrate().await.context("failed to apply migrations")?;
    Ok(pool)
}
