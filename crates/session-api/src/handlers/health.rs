use axum::{extract::State, Json};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
    session_backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    live_sessions: Option<usize>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.app.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        session_backend: state.config.session.backend.clone(),
        live_sessions: state.memory_store.as_ref().map(|s| s.stats().live_sessions),
    }))
}
