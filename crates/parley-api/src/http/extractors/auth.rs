//! Session authentication extractor.
//!
//! Reads the signed session cookie, resolves it against the in-memory
//! [`SessionStore`](crate::http::session::SessionStore) and yields the
//! logged-in user. Anything else redirects to `/login`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Redirect;
use parley_types::user::UserId;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::http::session::{SESSION_COOKIE, SessionToken};
use crate::state::AppState;

/// The logged-in user behind the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: SessionToken,
    pub user_id: UserId,
    pub username: String,
    pub active_chat: Option<Uuid>,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/login"))?;

        let token = cookies
            .signed(&state.cookie_key)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| Redirect::to("/login"))?;

        let session = state.sessions.get(&token).ok_or_else(|| {
            tracing::debug!("session cookie refers to an unknown session");
            Redirect::to("/login")
        })?;

        Ok(CurrentUser {
            token,
            user_id: session.user_id,
            username: session.username,
            active_chat: session.active_chat,
        })
    }
}
