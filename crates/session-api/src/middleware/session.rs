// ============================================================================
// Session API - Session Middleware
// File: crates/session-api/src/middleware/session.rs
// ============================================================================
//! Resolves the session before the handler runs and finalizes it afterwards.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use session_core::RequestContext;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Session middleware.
///
/// The handle is placed in the request extensions for the [`Session`]
/// extractor. Finalization only happens once the handler has produced a
/// response; if the request future is dropped first, nothing is written.
///
/// [`Session`]: crate::extractor::Session
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut context = RequestContext::new(request.headers().clone());
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        context = context.with_client_ip(addr.ip());
    }

    let handle = state.sessions.get_session(&context).await?;
    request.extensions_mut().insert(handle.clone());

    let mut response = next.run(request).await;
    let outcome = state.sessions.finalize(&handle, response.headers_mut()).await?;
    debug!("Session {} finalized: {:?}", handle.id(), outcome);

    Ok(response)
}
