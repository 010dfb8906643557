//! In-memory session storage for the web interface.
//!
//! Maps session tokens (UUIDs carried in a signed cookie) to the logged-in
//! user and their active chat. Sessions are ephemeral and lost on restart.
//! Chat data itself always comes from the store.
//!
//! A session expires after `ttl` without a request. Expired entries are
//! evicted on lookup and swept whenever a new session is created.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parley_types::user::{User, UserId};
use uuid::Uuid;

/// Name of the signed session cookie.
pub const SESSION_COOKIE: &str = "parley_session";

/// Session token (UUID stored in cookie).
pub type SessionToken = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: UserId,
    pub username: String,
    pub active_chat: Option<Uuid>,
}

#[derive(Debug)]
struct SessionEntry {
    data: SessionData,
    last_seen: Instant,
}

impl SessionEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() >= ttl
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<DashMap<SessionToken, SessionEntry>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Create a session for `user` and return its token.
    pub fn create_session(&self, user: &User) -> SessionToken {
        self.purge_expired();

        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                data: SessionData {
                    user_id: user.id,
                    username: user.username.clone(),
                    active_chat: None,
                },
                last_seen: Instant::now(),
            },
        );
        token
    }

    /// Look up a live session and mark it as seen. Expired sessions are
    /// removed and yield `None`.
    pub fn get(&self, token: &str) -> Option<SessionData> {
        if let Some(mut entry) = self.sessions.get_mut(token) {
            if !entry.is_expired(self.ttl) {
                entry.last_seen = Instant::now();
                return Some(entry.data.clone());
            }
        }
        let ttl = self.ttl;
        if self.sessions.remove_if(token, |_, e| e.is_expired(ttl)).is_some() {
            tracing::debug!("session expired");
        }
        None
    }

    /// Record the chat the session is looking at. No-op for unknown tokens.
    pub fn set_active_chat(&self, token: &str, chat_id: Option<Uuid>) {
        if let Some(mut entry) = self.sessions.get_mut(token) {
            entry.data.active_chat = chat_id;
        }
    }

    pub fn destroy_session(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every session idle for longer than the TTL. Returns the count.
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions.retain(|_, e| !e.is_expired(ttl));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            tracing::debug!(purged, "expired sessions removed");
        }
        purged
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "h".to_string(),
        }
    }

    #[test]
    fn test_session_lifecycle() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let token = store.create_session(&alice());
        let session = store.get(&token).unwrap();
        assert_eq!(session.user_id, 7);
        assert_eq!(session.username, "alice");
        assert!(session.active_chat.is_none());

        let chat_id = Uuid::new_v4();
        store.set_active_chat(&token, Some(chat_id));
        assert_eq!(store.get(&token).unwrap().active_chat, Some(chat_id));

        assert!(store.destroy_session(&token));
        assert!(store.get(&token).is_none());
        assert!(!store.destroy_session(&token));
    }

    #[test]
    fn test_tokens_are_distinct_per_login() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let a = store.create_session(&alice());
        let b = store.create_session(&alice());
        assert_ne!(a, b);
        assert_eq!(store.session_count(), 2);

        store.set_active_chat("missing", Some(Uuid::new_v4()));
        assert_eq!(store.session_count(), 2);
    }

    #[test]
    fn test_expired_session_is_evicted_on_lookup() {
        let store = SessionStore::new(Duration::ZERO);
        let token = store.create_session(&alice());
        assert!(store.get(&token).is_none());
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_create_session_sweeps_expired_entries() {
        let store = SessionStore::new(Duration::ZERO);
        for _ in 0..100 {
            store.create_session(&alice());
        }
        // Only the session created last survives the sweep.
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_purge_keeps_live_sessions() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let token = store.create_session(&alice());
        assert_eq!(store.purge_expired(), 0);
        assert!(store.get(&token).is_some());
    }
}
