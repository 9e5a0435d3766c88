//! Session lifecycle configuration

use std::str::FromStr;
use std::time::Duration;

use session_shared::constants::{DEFAULT_ID_BYTES, DEFAULT_SESSION_TTL_SECS, MIN_ID_BYTES};

use crate::error::SessionError;

/// Upper bound for a session lifetime (ten years).
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// How `expires_at` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// `last_accessed_at + ttl`
    #[default]
    Sliding,
    /// `created_at + ttl`
    Absolute,
}

impl ExpiryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryPolicy::Sliding => "sliding",
            ExpiryPolicy::Absolute => "absolute",
        }
    }
}

impl FromStr for ExpiryPolicy {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sliding" => Ok(ExpiryPolicy::Sliding),
            "absolute" => Ok(ExpiryPolicy::Absolute),
            other => Err(SessionError::InvalidConfig(format!("unknown expiry policy: {}", other))),
        }
    }
}

/// What happens to `created_at` when an identifier is rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationPolicy {
    #[default]
    PreserveCreatedAt,
    ResetCreatedAt,
}

impl FromStr for RotationPolicy {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "preserve" => Ok(RotationPolicy::PreserveCreatedAt),
            "reset" => Ok(RotationPolicy::ResetCreatedAt),
            other => Err(SessionError::InvalidConfig(format!("unknown rotation policy: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl: Duration,
    pub expiry: ExpiryPolicy,
    /// Random bytes per identifier.
    pub id_bytes: usize,
    pub rotation: RotationPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            expiry: ExpiryPolicy::default(),
            id_bytes: DEFAULT_ID_BYTES,
            rotation: RotationPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, ..Self::default() }
    }

    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_id_bytes(mut self, id_bytes: usize) -> Self {
        self.id_bytes = id_bytes;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.ttl.as_secs() == 0 {
            return Err(SessionError::InvalidConfig("ttl must be at least one second".into()));
        }
        if self.ttl.as_secs() > MAX_TTL_SECS {
            return Err(SessionError::InvalidConfig(format!(
                "ttl must not exceed {} seconds",
                MAX_TTL_SECS
            )));
        }
        if self.id_bytes < MIN_ID_BYTES {
            return Err(SessionError::InvalidConfig(format!(
                "id_bytes must be at least {}",
                MIN_ID_BYTES
            )));
        }
        Ok(())
    }

    pub(crate) fn ttl_delta(&self) -> chrono::Duration {
        to_chrono(self.ttl)
    }
}

/// Convert a validated std duration; out-of-range values clamp to the TTL ceiling.
pub fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or_else(|_| chrono::Duration::seconds(MAX_TTL_SECS as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_ttl() {
        assert!(SessionConfig::new(Duration::ZERO).validate().is_err());
    }

    #[test]
    fn test_rejects_ttl_above_ceiling() {
        assert!(SessionConfig::new(Duration::from_secs(MAX_TTL_SECS + 1)).validate().is_err());
        assert!(SessionConfig::new(Duration::from_secs(MAX_TTL_SECS)).validate().is_ok());
    }

    #[test]
    fn test_rejects_small_ids() {
        let config = SessionConfig::default().with_id_bytes(8);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_policies() {
        assert_eq!("Sliding".parse::<ExpiryPolicy>().unwrap(), ExpiryPolicy::Sliding);
        assert_eq!(" absolute ".parse::<ExpiryPolicy>().unwrap(), ExpiryPolicy::Absolute);
        assert!("forever".parse::<ExpiryPolicy>().is_err());
        assert_eq!("reset".parse::<RotationPolicy>().unwrap(), RotationPolicy::ResetCreatedAt);
        assert!("keep".parse::<RotationPolicy>().is_err());
    }
}
