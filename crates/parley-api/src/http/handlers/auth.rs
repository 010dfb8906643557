//! Registration, login, and logout handlers.
//!
//! The forms answer with HTML; failures re-render the form with the error
//! message and the status code `AppError` assigns to it.

use axum::Form;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies};

use crate::http::error::AppError;
use crate::http::pages;
use crate::http::session::SESSION_COOKIE;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

fn form_error(err: AppError, render: fn(Option<&str>) -> String) -> Response {
    let (status, code, message) = err.parts();
    if status.is_server_error() {
        tracing::error!(code, error = %message, "form submission failed");
    }
    (status, Html(render(Some(&message)))).into_response()
}

fn has_session(state: &AppState, cookies: &Cookies) -> bool {
    cookies
        .signed(&state.cookie_key)
        .get(SESSION_COOKIE)
        .is_some_and(|c| state.sessions.get(c.value()).is_some())
}

/// GET /login
pub async fn login_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if has_session(&state, &cookies) {
        return Redirect::to("/").into_response();
    }
    Html(pages::login_page(None)).into_response()
}

/// POST /login - verify credentials and start a session.
pub async fn login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let user = match state.auth_service.login(&form.username, &form.password).await {
        Ok(user) => user,
        Err(e) => return form_error(e.into(), pages::login_page),
    };

    let token = state.sessions.create_session(&user);
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.signed(&state.cookie_key).add(cookie);
    Redirect::to("/").into_response()
}

/// GET /register
pub async fn register_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if has_session(&state, &cookies) {
        return Redirect::to("/").into_response();
    }
    Html(pages::register_page(None)).into_response()
}

/// POST /register - create the account, then send the user to the login form.
pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match state.auth_service.register(&form.username, &form.password).await {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(e) => form_error(e.into(), pages::register_page),
    }
}

/// GET /logout and GET /clear_session - destroy the session.
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let signed = cookies.signed(&state.cookie_key);
    if let Some(cookie) = signed.get(SESSION_COOKIE) {
        state.sessions.destroy_session(cookie.value());
    }

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    cookies.remove(removal);
    Redirect::to("/login")
}
