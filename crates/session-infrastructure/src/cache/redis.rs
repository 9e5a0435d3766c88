// ============================================================================
// Session Infrastructure - Redis Session Store
// File: crates/session-infrastructure/src/cache/redis.rs
// ============================================================================
//! Remote session store backed by Redis.
//!
//! Records are stored as JSON under `<prefix><id>`. Expiry is native: every
//! write carries `PX`, so value and TTL are applied in a single command.

use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{Client, RedisError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use session_core::config::to_chrono;
use session_core::{ExpiryPolicy, SessionId, SessionRecord, SessionStore, StoreError};
use tracing::{info, warn};

pub struct RedisSessionStore {
    conn: ConnectionManager,
    key_prefix: String,
}

fn unavailable(e: RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Redis rejects `PX 0`; sub-millisecond lifetimes round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

impl RedisSessionStore {
    /// Connect to `url`. The connection manager reconnects on its own after
    /// the initial connection succeeds.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(unavailable)?;
        let conn = ConnectionManager::new(client).await.map_err(unavailable)?;
        info!("Connected to Redis session store");
        Ok(Self {
            conn,
            key_prefix: key_prefix.into(),
        })
    }

    fn key(&self, id: &SessionId) -> String {
        format!("{}{}", self.key_prefix, id.as_str())
    }

    fn encode(record: &SessionRecord) -> Result<String, StoreError> {
        serde_json::to_string(record).map_err(|e| StoreError::Codec(e.to_string()))
    }

    /// Write with `PX`; `only_existing` adds `XX`. Returns whether the value
    /// was written.
    async fn write(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
        only_existing: bool,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let mut cmd = ::redis::cmd("SET");
        cmd.arg(self.key(id))
            .arg(Self::encode(record)?)
            .arg("PX")
            .arg(ttl_millis(ttl));
        if only_existing {
            cmd.arg("XX");
        }
        let reply: Option<String> = cmd.query_async(&mut conn).await.map_err(unavailable)?;
        Ok(reply.is_some())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = ::redis::cmd("GET")
            .arg(self.key(id))
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                // Unreadable records count as absent and are replaced on the next write
                warn!("Discarding undecodable session {}: {}", id, e);
                Ok(None)
            }
        }
    }

    async fn set(&self, id: &SessionId, record: &SessionRecord, ttl: Duration) -> Result<(), StoreError> {
        self.write(id, record, ttl, false).await.map(|_| ())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = ::redis::cmd("DEL")
            .arg(self.key(id))
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    /// Read, move the timestamps and write back with `XX`, so a record
    /// deleted in between is not resurrected.
    async fn touch(&self, id: &SessionId, now: DateTime<Utc>, ttl: Duration) -> Result<bool, StoreError> {
        let Some(mut record) = self.get(id).await? else {
            return Ok(false);
        };
        record.refresh(now, to_chrono(ttl), ExpiryPolicy::Sliding);
        self.write(id, &record, ttl, true).await
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let count: i64 = ::redis::cmd("EXISTS")
            .arg(self.key(id))
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(count > 0)
    }
}
