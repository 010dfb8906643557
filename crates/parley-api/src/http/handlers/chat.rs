//! Chat handlers: the main view, sending messages, chat management, and
//! stopping in-flight replies.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::{Form, Json};
use parley_core::chat::service::Exchange;
use parley_core::gateway::validate_input;
use parley_types::chat::{Chat, ChatMessage};
use parley_types::style::Style;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Everything the chat page needs to render.
#[derive(Debug, Serialize)]
pub struct ChatView {
    pub username: String,
    pub active_chat: Chat,
    pub history: Vec<ChatMessage>,
    pub chats: Vec<Chat>,
    pub current_style: Style,
    pub styles: Vec<Style>,
}

#[derive(Debug, Deserialize)]
pub struct SendForm {
    #[serde(default)]
    pub user_input: String,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub status: &'static str,
    pub cancelled: usize,
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Resolve the session's active chat, creating one if it is missing or
/// gone, and remember it in the session.
async fn active_chat(state: &AppState, user: &CurrentUser) -> Result<Chat, AppError> {
    let chat = state
        .chat_service
        .ensure_active_chat(user.user_id, user.active_chat)
        .await?;
    if user.active_chat != Some(chat.id) {
        state.sessions.set_active_chat(&user.token, Some(chat.id));
    }
    Ok(chat)
}

/// GET /
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ApiResponse<ChatView>, AppError> {
    let started = Instant::now();
    let chat = active_chat(&state, &user).await?;
    let history = state.chat_service.history(user.user_id, &chat.id).await?;
    let chats = state.chat_service.list_chats(user.user_id).await?;
    let current_style = state.auth_service.get_style(user.user_id).await?;

    let view = ChatView {
        username: user.username,
        active_chat: chat,
        history,
        chats: chats.as_ref().clone(),
        current_style,
        styles: Style::ALL.to_vec(),
    };
    Ok(ApiResponse::success(view, Uuid::new_v4().to_string(), elapsed_ms(started)))
}

/// POST / - send a message to the active chat.
///
/// The request is registered for its whole lifetime so `/stop_response`
/// can abort it; the guard deregisters it on every exit path.
pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<SendForm>,
) -> Result<ApiResponse<Exchange>, AppError> {
    let started = Instant::now();
    validate_input(&form.user_input)?;
    let chat = active_chat(&state, &user).await?;

    let guard = state.registry.begin(user.user_id);
    let ctx = guard.context();
    let exchange = state
        .chat_service
        .send_message(ctx, &chat.id, &form.user_input)
        .await?;

    Ok(ApiResponse::success(
        exchange,
        ctx.request_id.to_string(),
        elapsed_ms(started),
    ))
}

/// GET /new_chat
pub async fn new_chat(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Redirect, AppError> {
    let chat = state.chat_service.new_chat(user.user_id).await?;
    state.sessions.set_active_chat(&user.token, Some(chat.id));
    Ok(Redirect::to("/"))
}

/// GET /switch_chat/{id} - ids that are malformed or not owned start a new chat.
pub async fn switch_chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let chat = match id.parse::<Uuid>() {
        Ok(chat_id) => state.chat_service.switch_chat(user.user_id, &chat_id).await?,
        Err(_) => state.chat_service.new_chat(user.user_id).await?,
    };
    state.sessions.set_active_chat(&user.token, Some(chat.id));
    Ok(Redirect::to("/"))
}

/// POST /reset_chat/{id}
pub async fn reset_chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    if let Ok(chat_id) = id.parse::<Uuid>() {
        if !state.chat_service.reset_chat(user.user_id, &chat_id).await? {
            tracing::debug!(user_id = user.user_id, %chat_id, "reset ignored for unowned chat");
        }
    }
    Ok(Redirect::to("/"))
}

/// POST /delete_chat/{id}
pub async fn delete_chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    if let Ok(chat_id) = id.parse::<Uuid>() {
        let replacement = state
            .chat_service
            .delete_chat(user.user_id, &chat_id, user.active_chat)
            .await?;
        if let Some(chat) = replacement {
            state.sessions.set_active_chat(&user.token, Some(chat.id));
        }
    }
    Ok(Redirect::to("/"))
}

/// POST /stop_response - cancel the caller's in-flight sends.
pub async fn stop_response(State(state): State<AppState>, user: CurrentUser) -> Json<StopResponse> {
    let cancelled = state.registry.cancel_user(user.user_id);
    Json(StopResponse {
        status: "stopped",
        cancelled,
    })
}
