//! Reply style preference.

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StyleForm {
    #[serde(default)]
    pub style: String,
}

/// POST /change_style - unknown styles are rejected with 400.
pub async fn change_style(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<StyleForm>,
) -> Result<Redirect, AppError> {
    state
        .auth_service
        .change_style(user.user_id, &form.style)
        .await?;
    Ok(Redirect::to("/"))
}
