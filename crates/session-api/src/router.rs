use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{health, session};
use crate::middleware::session_middleware;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/api/v1/session", get(session::show))
        .route("/api/v1/session/values", put(session::put_value))
        .route("/api/v1/session/values/{key}", delete(session::remove_value))
        .route("/api/v1/session/login", post(session::login))
        .route("/api/v1/session/logout", post(session::logout))
        .route("/api/v1/session/rotate", post(session::rotate))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(session_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
