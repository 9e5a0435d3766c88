//! Request-scoped session handle

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::domain::{SessionData, SessionId, SessionRecord};
use crate::error::SessionError;

/// Buffered, request-private view of one session.
///
/// Clones share state, so the middleware and the handler of the same request
/// see the same buffer. Nothing reaches the store until the manager
/// finalizes the handle.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<HandleState>>,
}

#[derive(Debug, Clone)]
pub(crate) struct HandleState {
    pub record: SessionRecord,
    pub is_new: bool,
    pub data_changed: bool,
    pub timestamps_changed: bool,
    pub destroyed: bool,
    pub rotate: bool,
    /// Rejected record to remove when the response is finalized
    pub discard: Option<SessionId>,
    pub finalized: bool,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("SessionHandle")
            .field("id", &state.record.id)
            .field("is_new", &state.is_new)
            .field("destroyed", &state.destroyed)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    pub(crate) fn created(record: SessionRecord, discard: Option<SessionId>) -> Self {
        Self::from_state(HandleState {
            record,
            is_new: true,
            data_changed: false,
            timestamps_changed: false,
            destroyed: false,
            rotate: false,
            discard,
            finalized: false,
        })
    }

    pub(crate) fn resolved(record: SessionRecord, timestamps_changed: bool) -> Self {
        Self::from_state(HandleState {
            record,
            is_new: false,
            data_changed: false,
            timestamps_changed,
            destroyed: false,
            rotate: false,
            discard: None,
            finalized: false,
        })
    }

    fn from_state(state: HandleState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.lock().record.id.clone()
    }

    /// True when no valid session was presented and this one was just created.
    pub fn is_new(&self) -> bool {
        self.inner.lock().is_new
    }

    pub fn is_modified(&self) -> bool {
        self.inner.lock().data_changed
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.lock().destroyed
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().record.data.get(key).cloned()
    }

    /// Typed read; a stored value of the wrong shape is an error.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        self.get(key)
            .map(serde_json::from_value)
            .transpose()
            .map_err(SessionError::from)
    }

    /// Snapshot of the whole payload.
    pub fn data(&self) -> SessionData {
        self.inner.lock().record.data.clone()
    }

    /// Snapshot of the whole record.
    pub fn record(&self) -> SessionRecord {
        self.inner.lock().record.clone()
    }

    pub fn insert<T: Serialize>(&self, key: impl Into<String>, value: T) -> Result<(), SessionError> {
        let value = serde_json::to_value(value)?;
        let mut state = self.inner.lock();
        if state.destroyed {
            return Err(SessionError::SessionDestroyed);
        }
        let key = key.into();
        if state.record.data.get(&key) != Some(&value) {
            state.record.data.insert(key, value);
            state.data_changed = true;
        }
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut state = self.inner.lock();
        let removed = state.record.data.remove(key);
        if removed.is_some() {
            state.data_changed = true;
        }
        removed
    }

    pub fn clear(&self) {
        let mut state = self.inner.lock();
        if !state.record.data.is_empty() {
            state.record.data.clear();
            state.data_changed = true;
        }
    }

    /// End the session (logout). Idempotent.
    pub fn destroy(&self) {
        let mut state = self.inner.lock();
        state.destroyed = true;
        state.rotate = false;
        state.record.data.clear();
    }

    /// Move the session to a new identifier when the response is finalized,
    /// carrying the data over. Use after any privilege change.
    pub fn rotate(&self) {
        let mut state = self.inner.lock();
        if !state.destroyed {
            state.rotate = true;
        }
    }

    /// Take the state for persistence; `None` if already finalized.
    pub(crate) fn begin_finalize(&self) -> Option<HandleState> {
        let mut state = self.inner.lock();
        if state.finalized {
            return None;
        }
        state.finalized = true;
        Some(state.clone())
    }

    pub(crate) fn finish_rotation(&self, record: &SessionRecord) {
        let mut state = self.inner.lock();
        state.record.id = record.id.clone();
        state.record.created_at = record.created_at;
        state.record.expires_at = record.expires_at;
        state.rotate = false;
    }
}
