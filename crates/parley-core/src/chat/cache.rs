//! Read-through TTL cache for per-user chat lists.
//!
//! The store stays the single source of truth. Every mutation of a user's
//! chats must call [`ChatListCache::invalidate`] for that user. Each
//! invalidation bumps a per-owner generation; a load that started before the
//! bump is returned to its caller but never cached.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parley_types::chat::Chat;
use parley_types::user::UserId;

#[derive(Debug, Clone)]
struct CachedList {
    fetched_at: Instant,
    chats: Arc<Vec<Chat>>,
}

/// Chat lists keyed by owner, expiring after `ttl`.
#[derive(Debug, Clone)]
pub struct ChatListCache {
    ttl: Duration,
    entries: Arc<DashMap<UserId, CachedList>>,
    generations: Arc<DashMap<UserId, u64>>,
}

impl ChatListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(DashMap::new()),
            generations: Arc::new(DashMap::new()),
        }
    }

    /// Fresh cached list for `user_id`, if any. Expired entries are evicted.
    pub fn get(&self, user_id: UserId) -> Option<Arc<Vec<Chat>>> {
        let hit = self
            .entries
            .get(&user_id)
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.chats.clone());
        if hit.is_none() {
            let ttl = self.ttl;
            self.entries
                .remove_if(&user_id, |_, e| e.fetched_at.elapsed() >= ttl);
        }
        hit
    }

    pub fn insert(&self, user_id: UserId, chats: Vec<Chat>) -> Arc<Vec<Chat>> {
        let chats = Arc::new(chats);
        self.entries.insert(
            user_id,
            CachedList {
                fetched_at: Instant::now(),
                chats: chats.clone(),
            },
        );
        chats
    }

    pub fn invalidate(&self, user_id: UserId) {
        *self.generations.entry(user_id).or_insert(0) += 1;
        self.entries.remove(&user_id);
    }

    fn generation(&self, user_id: UserId) -> u64 {
        self.generations.get(&user_id).map_or(0, |g| *g)
    }

    /// Return the cached list or load it with `load` and cache the result.
    pub async fn get_or_load<F, Fut, E>(&self, user_id: UserId, load: F) -> Result<Arc<Vec<Chat>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Chat>, E>>,
    {
        if let Some(chats) = self.get(user_id) {
            tracing::trace!(user_id, "chat list cache hit");
            return Ok(chats);
        }
        let generation = self.generation(user_id);
        let chats = load().await?;

        // Hold the generation shard while inserting so a concurrent
        // invalidate either precedes the check or removes our entry.
        let current = self.generations.entry(user_id).or_insert(0);
        if *current != generation {
            tracing::trace!(user_id, "chat list invalidated during load, not cached");
            return Ok(Arc::new(chats));
        }
        let chats = self.insert(user_id, chats);
        drop(current);
        Ok(chats)
    }
}
