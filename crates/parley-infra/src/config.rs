//! Configuration loader for Parley.
//!
//! Reads `parley.toml` (from the data directory, `~/.parley/` in production,
//! or an explicit `--config` path) into [`AppConfig`], then applies
//! environment overrides. Falls back to defaults when the file is missing or
//! malformed. Secrets come only from the environment.

use std::path::{Path, PathBuf};

use parley_types::config::AppConfig;
use secrecy::SecretString;

/// Name of the config file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "parley.toml";

/// Environment variable names.
pub mod env {
    pub const DATA_DIR: &str = "PARLEY_DATA_DIR";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const API_KEY: &str = "OPENROUTER_API_KEY";
    pub const SESSION_SECRET: &str = "SESSION_SECRET";
    pub const PORT: &str = "PORT";
}

/// Secrets read from the environment. Never serialized or logged.
pub struct Secrets {
    pub api_key: Option<SecretString>,
    pub session_secret: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from)
        };
        Self {
            api_key: read(env::API_KEY),
            session_secret: read(env::SESSION_SECRET),
        }
    }
}

/// Resolve the data directory: `PARLEY_DATA_DIR`, else `~/.parley`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(env::DATA_DIR) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".parley")
}

/// Load configuration from `path` (or `{data_dir}/parley.toml`) and apply
/// environment overrides.
pub async fn load_config(path: Option<&Path>, data_dir: &Path) -> AppConfig {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
    let mut config = load_config_file(&config_path).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Read and parse a TOML config file.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_config_file(config_path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Apply `DATABASE_URL` and `PORT` from `lookup` on top of file values.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(env::DATABASE_URL).filter(|v| !v.trim().is_empty()) {
        config.database.url = Some(url);
    }
    if let Some(port) = lookup(env::PORT) {
        match port.trim().parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(err) => tracing::warn!("Ignoring invalid {}={port:?}: {err}", env::PORT),
        }
    }
}
