//! Transport trait (port)

use std::time::Duration;

use http::HeaderMap;
use thiserror::Error;

use crate::domain::SessionId;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport misconfigured: {0}")]
    Misconfigured(String),

    #[error("Failed to encode session token: {0}")]
    Encoding(String),
}

/// Carries the session identifier between client and server.
pub trait SessionTransport: Send + Sync {
    /// Read the identifier from one fixed location. Anything missing,
    /// malformed or tampered with is `None`.
    fn extract(&self, headers: &HeaderMap) -> Option<SessionId>;

    /// Attach `id` to the response with a lifetime of exactly `ttl`.
    fn encode(&self, headers: &mut HeaderMap, id: &SessionId, ttl: Duration) -> Result<(), TransportError>;

    /// Expire the client-side artifact immediately.
    fn clear(&self, headers: &mut HeaderMap) -> Result<(), TransportError>;
}
