// ============================================================================
// Session Core - Session Identifier
// File: crates/session-core/src/domain/session_id.rs
// ============================================================================
//! Opaque, high-entropy session identifier

use std::fmt;

use serde::{Deserialize, Serialize};
use session_security::generate_token;
use session_shared::utils::redact;

/// Session identifier.
///
/// `Debug` and `Display` only show a short prefix so identifiers can be
/// logged without leaking a usable value. Use [`SessionId::as_str`] for the
/// raw token.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier from `byte_len` bytes of CSPRNG output.
    pub fn generate(byte_len: usize) -> Self {
        Self(generate_token(byte_len))
    }

    /// Wrap an identifier received from a client or a backend.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn redacted(&self) -> String {
        redact(&self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionId").field(&self.redacted()).finish()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: HashSet<SessionId> = (0..10_000).map(|_| SessionId::generate(32)).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_formatting_is_redacted() {
        let id = SessionId::from_raw("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(id.to_string(), "abcdef***");
        assert!(!format!("{:?}", id).contains("ghijkl"));
        assert_eq!(id.as_str(), "abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = SessionId::from_raw("token");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"token\"");
    }
}
