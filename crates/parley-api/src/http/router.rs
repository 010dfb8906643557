//! Axum router configuration with middleware.
//!
//! Middleware: signed cookie sessions, request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers::{auth, chat, health, style};
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Chat
        .route("/", get(chat::index).post(chat::send_message))
        .route("/new_chat", get(chat::new_chat))
        .route("/switch_chat/{id}", get(chat::switch_chat))
        .route("/reset_chat/{id}", post(chat::reset_chat))
        .route("/delete_chat/{id}", post(chat::delete_chat))
        .route("/stop_response", post(chat::stop_response))
        .route("/change_style", post(style::change_style))
        // Accounts
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/register", get(auth::register_page).post(auth::register_submit))
        .route("/logout", get(auth::logout))
        .route("/clear_session", get(auth::logout))
        .route("/health", get(health::health_check))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
