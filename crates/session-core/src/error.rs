//! Session errors

use thiserror::Error;

use crate::repositories::StoreError;
use crate::transport::TransportError;

/// Errors surfaced to the integration layer.
///
/// Stale, forged or rejected identifiers never show up here: they are turned
/// into a fresh session instead.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session backend failure: {0}")]
    Backend(#[from] StoreError),

    #[error("Session transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("Session value could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session has been destroyed")]
    SessionDestroyed,

    #[error("Unable to generate a unique session id after {0} attempts")]
    IdCollision(usize),

    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    /// True when the backing store could not be reached.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, SessionError::Backend(StoreError::Unavailable(_)))
    }
}
