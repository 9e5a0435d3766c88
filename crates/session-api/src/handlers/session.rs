// ============================================================================
// Session API - Session Handlers
// File: crates/session-api/src/handlers/session.rs
// ============================================================================
//! Session HTTP handlers (read, write, login, logout, rotate)

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path},
    Extension,
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use session_core::verification::{CLIENT_IP_KEY, USER_AGENT_KEY};
use session_core::SessionData;
use tracing::info;
use validator::Validate;

use crate::error::ApiError;
use crate::extractor::Session;
use crate::response::ApiResponse;

/// Keys starting with this prefix hold bindings and are not writable here
const RESERVED_PREFIX: char = '_';

/// Session data with binding keys hidden
fn visible_data(session: &Session) -> SessionData {
    let mut data = session.data();
    data.retain(|key, _| !key.starts_with(RESERVED_PREFIX));
    data
}

#[derive(Debug, Deserialize, Validate)]
pub struct PutValueRequest {
    #[validate(length(min = 1, max = 128))]
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub user: String,
}

fn ensure_writable(key: &str) -> Result<(), ApiError> {
    if key.starts_with(RESERVED_PREFIX) {
        return Err(ApiError::BadRequest(format!("key '{}' is reserved", key)));
    }
    Ok(())
}

/// Current session - GET /api/v1/session
pub async fn show(session: Session) -> Json<ApiResponse<SessionData>> {
    Json(ApiResponse::with_session(visible_data(&session), &session))
}

/// Store a value - PUT /api/v1/session/values
pub async fn put_value(
    session: Session,
    Json(payload): Json<PutValueRequest>,
) -> Result<Json<ApiResponse<SessionData>>, ApiError> {
    payload.validate()?;
    ensure_writable(&payload.key)?;

    session.insert(payload.key, payload.value)?;
    Ok(Json(ApiResponse::with_session(visible_data(&session), &session)))
}

/// Remove a value - DELETE /api/v1/session/values/{key}
pub async fn remove_value(
    session: Session,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<Option<Value>>>, ApiError> {
    ensure_writable(&key)?;
    let removed = session.remove(&key);
    Ok(Json(ApiResponse::with_session(removed, &session)))
}

/// Sign in - POST /api/v1/session/login
///
/// Binds the session to the caller's user agent and address, then moves it
/// to a fresh identifier.
pub async fn login(
    session: Session,
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionData>>, ApiError> {
    payload.validate()?;

    session.insert("user", &payload.user)?;
    if let Some(agent) = headers.get(USER_AGENT).and_then(|v| v.to_str().ok()) {
        session.insert(USER_AGENT_KEY, agent)?;
    }
    if let Some(Extension(ConnectInfo(addr))) = connect_info {
        session.insert(CLIENT_IP_KEY, addr.ip().to_string())?;
    }
    session.rotate();

    info!("User {} signed in", payload.user);
    Ok(Json(ApiResponse::with_session(visible_data(&session), &session)))
}

/// Sign out - POST /api/v1/session/logout
pub async fn logout(session: Session) -> StatusCode {
    session.destroy();
    StatusCode::NO_CONTENT
}

/// New identifier, same data - POST /api/v1/session/rotate
pub async fn rotate(session: Session) -> StatusCode {
    session.rotate();
    StatusCode::NO_CONTENT
}
