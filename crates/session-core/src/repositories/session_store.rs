//! Session store trait (port)

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{to_chrono, ExpiryPolicy};
use crate::domain::{SessionId, SessionRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Record codec error: {0}")]
    Codec(String),
}

/// Storage for session records, keyed by identifier.
///
/// Implementations must be safe to call concurrently from many requests.
/// Writes to the same id are last-writer-wins; the store offers no
/// read-modify-write atomicity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` for absent or dead records, never an error.
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Upsert `record`, applying `ttl` atomically with the write.
    async fn set(&self, id: &SessionId, record: &SessionRecord, ttl: Duration) -> Result<(), StoreError>;

    /// Idempotent: deleting an absent id succeeds.
    async fn delete(&self, id: &SessionId) -> Result<(), StoreError>;

    /// Slide a live record: `last_accessed_at = now`, `expires_at = now + ttl`,
    /// data untouched. Only meaningful under sliding expiry; the manager never
    /// touches absolute sessions. Returns `false` when no live record exists.
    ///
    /// The default is a plain get-then-set and races like any other write.
    async fn touch(&self, id: &SessionId, now: DateTime<Utc>, ttl: Duration) -> Result<bool, StoreError> {
        let Some(mut record) = self.get(id).await? else {
            return Ok(false);
        };
        record.refresh(now, to_chrono(ttl), ExpiryPolicy::Sliding);
        self.set(id, &record, ttl).await?;
        Ok(true)
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, StoreError> {
        Ok(self.get(id).await?.is_some())
    }
}
