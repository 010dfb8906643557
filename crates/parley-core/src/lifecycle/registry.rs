//! Process-wide registry of in-flight completion requests.
//!
//! `begin` registers a [`RequestContext`] and hands back a [`RequestGuard`]
//! that removes the entry when dropped, so the registry is cleaned up on
//! every exit path including client disconnects (axum drops the handler
//! future) and panics.

use std::sync::Arc;

use dashmap::DashMap;
use parley_types::user::UserId;
use uuid::Uuid;

use super::request_context::RequestContext;

/// Shared map of request id -> context. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct RequestRegistry {
    inner: Arc<DashMap<Uuid, RequestContext>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request for `user_id`.
    pub fn begin(&self, user_id: UserId) -> RequestGuard {
        let ctx = RequestContext::new(user_id);
        self.inner.insert(ctx.request_id, ctx.clone());
        tracing::debug!(request_id = %ctx.request_id, user_id, "request registered");
        RequestGuard {
            registry: self.inner.clone(),
            ctx,
        }
    }

    /// Cancel every in-flight request owned by `user_id`. Returns the count.
    pub fn cancel_user(&self, user_id: UserId) -> usize {
        let mut cancelled = 0;
        for entry in self.inner.iter().filter(|e| e.value().user_id == user_id) {
            entry.value().cancel();
            cancelled += 1;
        }
        if cancelled > 0 {
            tracing::info!(user_id, cancelled, "cancelled in-flight requests");
        }
        cancelled
    }

    /// Cancel everything. Used on shutdown.
    pub fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        for entry in self.inner.iter() {
            entry.value().cancel();
            cancelled += 1;
        }
        cancelled
    }

    /// Number of registered requests.
    pub fn in_flight(&self) -> usize {
        self.inner.len()
    }

    /// Number of registered requests owned by `user_id`.
    pub fn in_flight_for(&self, user_id: UserId) -> usize {
        self.inner
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .count()
    }
}

/// RAII handle for a registered request. Deregisters on drop.
#[derive(Debug)]
pub struct RequestGuard {
    registry: Arc<DashMap<Uuid, RequestContext>>,
    ctx: RequestContext,
}

impl RequestGuard {
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.ctx.request_id);
        tracing::debug!(request_id = %self.ctx.request_id, "request deregistered");
    }
}
