// ============================================================================
// Session Core - Session Record Entity
// File: crates/session-core/src/domain/session_record.rs
// Description: Server-side session state keyed by identifier
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::SessionId;
use crate::config::ExpiryPolicy;

/// Application payload: string keys to arbitrary JSON values.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

/// Session Record entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,

    #[serde(default)]
    pub data: SessionData,

    pub created_at: DateTime<Utc>,

    pub last_accessed_at: DateTime<Utc>,

    /// Always `>= created_at`
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create an empty record living `ttl` from `now`
    pub fn new(id: SessionId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id,
            data: SessionData::new(),
            created_at: now,
            last_accessed_at: now,
            expires_at: now + ttl.max(Duration::zero()),
        }
    }

    /// Dead records must never be treated as valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, `None` once dead.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        if self.is_expired(now) {
            return None;
        }
        (self.expires_at - now).to_std().ok()
    }

    /// Record an access at `now` and move the expiry per `policy`.
    pub fn refresh(&mut self, now: DateTime<Utc>, ttl: Duration, policy: ExpiryPolicy) {
        self.last_accessed_at = now;
        self.expires_at = match policy {
            ExpiryPolicy::Sliding => now + ttl,
            ExpiryPolicy::Absolute => self.created_at + ttl,
        }
        .max(self.created_at);
    }

    /// Restart the record's lifetime at `now`, as if it had just been created.
    pub fn restart(&mut self, now: DateTime<Utc>, ttl: Duration) {
        self.created_at = now;
        self.last_accessed_at = now;
        self.expires_at = now + ttl;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_new_record() {
        let record = SessionRecord::new(SessionId::from_raw("id"), at(0), Duration::seconds(60));
        assert!(record.data.is_empty());
        assert_eq!(record.created_at, at(0));
        assert_eq!(record.last_accessed_at, at(0));
        assert_eq!(record.expires_at, at(60));
    }

    #[test]
    fn test_expiry_boundary() {
        let record = SessionRecord::new(SessionId::from_raw("id"), at(0), Duration::seconds(60));
        assert!(!record.is_expired(at(59)));
        assert!(record.is_expired(at(60)));
        assert_eq!(record.remaining(at(45)), Some(std::time::Duration::from_secs(15)));
        assert_eq!(record.remaining(at(61)), None);
    }

    #[test]
    fn test_sliding_refresh() {
        let mut record = SessionRecord::new(SessionId::from_raw("id"), at(0), Duration::seconds(60));
        record.refresh(at(30), Duration::seconds(60), ExpiryPolicy::Sliding);
        assert_eq!(record.last_accessed_at, at(30));
        assert_eq!(record.expires_at, at(90));
    }

    #[test]
    fn test_absolute_refresh_keeps_expiry() {
        let mut record = SessionRecord::new(SessionId::from_raw("id"), at(0), Duration::seconds(60));
        record.refresh(at(30), Duration::seconds(60), ExpiryPolicy::Absolute);
        assert_eq!(record.last_accessed_at, at(30));
        assert_eq!(record.expires_at, at(60));
    }

    #[test]
    fn test_restart() {
        let mut record = SessionRecord::new(SessionId::from_raw("id"), at(0), Duration::seconds(60));
        record.restart(at(40), Duration::seconds(60));
        assert_eq!(record.created_at, at(40));
        assert_eq!(record.expires_at, at(100));
    }

    #[test]
    fn test_json_roundtrip_keeps_payload() {
        let mut record = SessionRecord::new(SessionId::from_raw("id"), at(0), Duration::seconds(60));
        record.data.insert("user".into(), serde_json::json!("alice"));
        let json = serde_json::to_string(&record).unwrap();
        let decoded: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }
}
