// ============================================================================
// Session Core - Session Manager
// File: crates/session-core/src/services/session_manager.rs
// ============================================================================
//! Per-request session lifecycle: resolve or create, then persist once.
//!
//! Concurrent requests presenting the same identifier each work on a private
//! copy of the record and race at the store with last-write-wins semantics.
//! Sessions are not meant for strict multi-tab consistency.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::HeaderMap;
use session_shared::constants::MAX_ID_GENERATION_ATTEMPTS;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{ExpiryPolicy, RotationPolicy, SessionConfig};
use crate::domain::{RequestContext, SessionId, SessionRecord, VerifyContext};
use crate::error::SessionError;
use crate::repositories::SessionStore;
use crate::services::session_handle::SessionHandle;
use crate::transport::SessionTransport;
use crate::verification::VerifierPipeline;

/// Terminal state of one request's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Record written and identifier re-encoded
    Persisted,
    /// Data untouched; expiry slid in place and identifier re-encoded
    Refreshed,
    /// Nothing written or emitted
    Unchanged,
    /// Record deleted and transport artifact cleared
    Destroyed,
    /// Record ran out of lifetime, or vanished from the store, while the
    /// request was handled
    Expired,
    /// `finalize` had already run for this handle
    AlreadyFinalized,
}

/// Session manager orchestrating store, transport and verifiers
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    transport: Arc<dyn SessionTransport>,
    verifiers: VerifierPipeline,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn SessionTransport>,
        verifiers: VerifierPipeline,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        info!(
            "Session manager ready: ttl={}s, expiry={}, verifiers={:?}",
            config.ttl.as_secs(),
            config.expiry.as_str(),
            verifiers.names()
        );
        Ok(Self {
            store,
            transport,
            verifiers,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resolve the request's session, creating a fresh one when the request
    /// carries no usable identifier.
    ///
    /// Only backend failures are errors; absent, forged, unknown, dead and
    /// rejected sessions all yield a new session.
    pub async fn get_session(&self, request: &RequestContext) -> Result<SessionHandle, SessionError> {
        let now = self.clock.now();

        let Some(id) = self.transport.extract(request.headers()) else {
            debug!("No session identifier presented, creating session");
            return self.create(now, None).await;
        };

        let Some(mut record) = self.store.get(&id).await? else {
            debug!("Session {} not found, creating session", id);
            return self.create(now, None).await;
        };

        if let Err(failure) = self.verifiers.run(&record, &VerifyContext::new(request, now)) {
            debug!("Session {} rejected by {}: {}", id, failure.verifier, failure.reason);
            return self.create(now, Some(id)).await;
        }

        let refreshed = self.refresh(&mut record, now);
        debug!("Session {} resolved (refreshed: {})", id, refreshed);
        Ok(SessionHandle::resolved(record, refreshed))
    }

    /// Persist the handle and write the transport artifact into `headers`.
    ///
    /// Runs at most once per handle; this is the only place session state is
    /// written, so a request dropped before it leaves the store untouched.
    pub async fn finalize(
        &self,
        handle: &SessionHandle,
        headers: &mut HeaderMap,
    ) -> Result<SessionOutcome, SessionError> {
        let Some(state) = handle.begin_finalize() else {
            warn!("Session finalize called twice, ignoring");
            return Ok(SessionOutcome::AlreadyFinalized);
        };
        let now = self.clock.now();

        if let Some(stale) = &state.discard {
            self.store.delete(stale).await?;
        }

        if state.destroyed {
            self.store.delete(&state.record.id).await?;
            self.transport.clear(headers)?;
            info!("Session {} destroyed", state.record.id);
            return Ok(SessionOutcome::Destroyed);
        }

        let mut record = state.record;

        if state.rotate {
            let previous = record.id.clone();
            if !state.is_new {
                self.store.delete(&previous).await?;
            }
            record.id = self.unique_id().await?;
            if self.config.rotation == RotationPolicy::ResetCreatedAt {
                record.restart(now, self.config.ttl_delta());
            }
            handle.finish_rotation(&record);
            info!("Session {} rotated to {}", previous, record.id);
        }

        let Some(ttl) = record.remaining(now) else {
            self.store.delete(&record.id).await?;
            self.transport.clear(headers)?;
            debug!("Session {} expired during the request", record.id);
            return Ok(SessionOutcome::Expired);
        };

        if state.is_new || state.data_changed || state.rotate {
            // Sign before writing so a transport failure leaves nothing behind
            let mut encoded = HeaderMap::new();
            self.transport.encode(&mut encoded, &record.id, ttl)?;
            self.store.set(&record.id, &record, ttl).await?;
            headers.extend(encoded);
            debug!("Session {} persisted", record.id);
            return Ok(SessionOutcome::Persisted);
        }

        if state.timestamps_changed {
            // Slide in place so data written by a concurrent request survives
            let mut encoded = HeaderMap::new();
            self.transport.encode(&mut encoded, &record.id, ttl)?;
            if !self.store.touch(&record.id, now, ttl).await? {
                self.transport.clear(headers)?;
                debug!("Session {} left the store before its refresh", record.id);
                return Ok(SessionOutcome::Expired);
            }
            headers.extend(encoded);
            return Ok(SessionOutcome::Refreshed);
        }

        if self.config.expiry == ExpiryPolicy::Sliding {
            self.transport.encode(headers, &record.id, ttl)?;
            return Ok(SessionOutcome::Refreshed);
        }

        Ok(SessionOutcome::Unchanged)
    }

    async fn create(
        &self,
        now: DateTime<Utc>,
        discard: Option<SessionId>,
    ) -> Result<SessionHandle, SessionError> {
        let id = self.unique_id().await?;
        let record = SessionRecord::new(id, now, self.config.ttl_delta());
        Ok(SessionHandle::created(record, discard))
    }

    /// Move `last_accessed_at` (and a sliding expiry) on every valid access.
    /// Returns true only when the expiry moved, since an access time alone is
    /// not worth a write.
    fn refresh(&self, record: &mut SessionRecord, now: DateTime<Utc>) -> bool {
        let previous = record.expires_at;
        record.refresh(now, self.config.ttl_delta(), self.config.expiry);
        record.expires_at != previous
    }

    async fn unique_id(&self) -> Result<SessionId, SessionError> {
        for _ in 0..MAX_ID_GENERATION_ATTEMPTS {
            let id = SessionId::generate(self.config.id_bytes);
            if !self.store.exists(&id).await? {
                return Ok(id);
            }
            warn!("Generated session id {} already exists, retrying", id);
        }
        Err(SessionError::IdCollision(MAX_ID_GENERATION_ATTEMPTS))
    }
}
