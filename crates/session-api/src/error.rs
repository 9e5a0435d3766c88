use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use session_core::SessionError;
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session store unavailable: {0}")]
    SessionUnavailable(String),

    #[error("Session already destroyed")]
    SessionDestroyed,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            e if e.is_backend_unavailable() => ApiError::SessionUnavailable(e.to_string()),
            SessionError::SessionDestroyed => ApiError::SessionDestroyed,
            SessionError::Serialization(e) => ApiError::BadRequest(e.to_string()),
            e => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal details stay in the logs
        let (status, code, message) = match self {
            ApiError::SessionUnavailable(msg) => {
                tracing::error!("Session store unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "SESSION_UNAVAILABLE", "Session store unavailable".to_string())
            }
            ApiError::SessionDestroyed => {
                tracing::warn!("Write to destroyed session");
                (StatusCode::CONFLICT, "SESSION_DESTROYED", "Session already destroyed".to_string())
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        (status, Json(ApiResponse::<()>::error(code, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_core::StoreError;

    #[test]
    fn test_status_mapping() {
        let unavailable: ApiError = SessionError::Backend(StoreError::Unavailable("down".into())).into();
        assert_eq!(unavailable.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let codec: ApiError = SessionError::Backend(StoreError::Codec("bad".into())).into();
        assert_eq!(codec.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let destroyed: ApiError = SessionError::SessionDestroyed.into();
        assert_eq!(destroyed.into_response().status(), StatusCode::CONFLICT);
    }
}
