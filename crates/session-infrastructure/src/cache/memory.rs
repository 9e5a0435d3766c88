//! In-memory session store
//!
//! Process-local only: records are not shared between server instances, so
//! this store is for single-node deployments and tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use session_core::config::to_chrono;
use session_core::{Clock, ExpiryPolicy, SessionId, SessionRecord, SessionStore, StoreError, SystemClock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct Entry {
    record: SessionRecord,
    /// Store-side deadline from the `ttl` of the last write
    deadline: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.deadline && !self.record.is_expired(now)
    }
}

/// Thread-safe in-memory session store.
///
/// Expiry is enforced lazily on read; [`MemorySessionStore::cleanup_expired`]
/// (or the sweeper task) reclaims entries nobody reads again.
#[derive(Clone)]
pub struct MemorySessionStore {
    entries: Arc<DashMap<SessionId, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        info!("Initializing in-memory session store");
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, dead ones not yet reclaimed included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every dead entry. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let start_len = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let count = start_len.saturating_sub(self.entries.len());

        if count > 0 {
            info!("Cleaned up {} expired sessions", count);
        }

        count
    }

    /// Run [`cleanup_expired`](Self::cleanup_expired) every `interval` until
    /// the returned task is aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.cleanup_expired();
            }
        })
    }

    pub fn stats(&self) -> MemoryStoreStats {
        let now = self.clock.now();
        let live_sessions = self.entries.iter().filter(|e| e.value().is_live(now)).count();
        let total = self.entries.len();
        MemoryStoreStats {
            live_sessions,
            expired_pending: total.saturating_sub(live_sessions),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Store statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStoreStats {
    pub live_sessions: usize,
    /// Dead entries not yet removed by a read or a sweep
    pub expired_pending: usize,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let now = self.clock.now();
        let Some(entry) = self.entries.get(id) else {
            return Ok(None);
        };

        if entry.is_live(now) {
            return Ok(Some(entry.record.clone()));
        }

        drop(entry); // Release read lock
        self.entries.remove_if(id, |_, entry| !entry.is_live(now));
        debug!("Session {} expired, removed from store", id);
        Ok(None)
    }

    async fn set(&self, id: &SessionId, record: &SessionRecord, ttl: Duration) -> Result<(), StoreError> {
        let deadline = self.clock.now() + to_chrono(ttl);
        self.entries.insert(
            id.clone(),
            Entry {
                record: record.clone(),
                deadline,
            },
        );
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        self.entries.remove(id);
        Ok(())
    }

    async fn touch(&self, id: &SessionId, now: DateTime<Utc>, ttl: Duration) -> Result<bool, StoreError> {
        let store_now = self.clock.now();
        let Some(mut entry) = self.entries.get_mut(id) else {
            return Ok(false);
        };
        if !entry.is_live(store_now) {
            return Ok(false);
        }
        let ttl = to_chrono(ttl);
        entry.record.refresh(now, ttl, ExpiryPolicy::Sliding);
        entry.deadline = store_now + ttl;
        Ok(true)
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, StoreError> {
        let now = self.clock.now();
        Ok(self.entries.get(id).is_some_and(|entry| entry.is_live(now)))
    }
}
