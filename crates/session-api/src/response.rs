//! JSON envelope for every endpoint.
//!
//! Session routes add a `session` block describing the session the request
//! ran under, as it stood when the handler returned.

use chrono::{DateTime, Utc};
use serde::Serialize;
use session_core::SessionHandle;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionState>,
    pub error: Option<ErrorBody>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionState {
    pub is_new: bool,
    /// Data changed during this request and will be written at finalize
    pub modified: bool,
    pub expires_at: DateTime<Utc>,
}

impl SessionState {
    pub fn of(handle: &SessionHandle) -> Self {
        Self {
            is_new: handle.is_new(),
            modified: handle.is_modified(),
            expires_at: handle.record().expires_at,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            session: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_session(data: T, handle: &SessionHandle) -> Self {
        Self {
            session: Some(SessionState::of(handle)),
            ..Self::success(data)
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            session: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            }),
            timestamp: Utc::now(),
        }
    }
}
