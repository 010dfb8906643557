use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// GET /health - liveness check (no auth required).
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "in_flight": state.registry.in_flight(),
        "sessions": state.sessions.session_count(),
    }))
}
