//! Request context for a single chat completion.
//!
//! `RequestContext` is created by the [`RequestRegistry`](super::registry::RequestRegistry)
//! when a send begins and is passed explicitly through the service, gateway,
//! and provider call chain. Cancelling the token aborts the outbound call.

use parley_types::user::UserId;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Identity and cancellation handle of one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request.
    pub request_id: Uuid,
    /// Owner of the request; `stop` is scoped to this user.
    pub user_id: UserId,
    /// Cancelled by `stop_response` or on server shutdown.
    pub cancellation: CancellationToken,
}

impl RequestContext {
    /// Create a fresh context with a random (v4) request ID.
    pub fn new(user_id: UserId) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_id,
            cancellation: CancellationToken::new(),
        }
    }

    /// Check whether this context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cancel this context.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }
}
