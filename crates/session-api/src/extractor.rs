//! Session extractor

use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};
use session_core::SessionHandle;

use crate::error::ApiError;

/// The current request's session. Requires [`session_middleware`] on the
/// route.
///
/// [`session_middleware`]: crate::middleware::session_middleware
#[derive(Debug, Clone)]
pub struct Session(pub SessionHandle);

impl Deref for Session {
    type Target = SessionHandle;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .map(Session)
            .ok_or_else(|| ApiError::InternalError("session middleware not installed".to_string()))
    }
}
