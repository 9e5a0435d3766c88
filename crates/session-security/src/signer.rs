//! Timed HMAC token signing

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: char = '.';

#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Secret too short: need at least {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },
    #[error("Signing failed: {0}")]
    SigningError(String),
}

/// Why a token was not accepted. Callers treat every variant as "no token".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("Token malformed")]
    Malformed,
    #[error("Token signature mismatch")]
    BadSignature,
    #[error("Token expired")]
    Expired,
}

/// Signs values as `<value>.<issued_at>.<mac>`.
///
/// The MAC key is derived from the secret and a salt, so the same secret can
/// back several signers without their tokens being interchangeable.
#[derive(Clone)]
pub struct TimedSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for TimedSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedSigner").finish_non_exhaustive()
    }
}

impl TimedSigner {
    pub fn new(secret: &[u8], salt: &str, min_secret_len: usize) -> Result<Self, SignerError> {
        if secret.len() < min_secret_len {
            return Err(SignerError::SecretTooShort {
                min: min_secret_len,
                actual: secret.len(),
            });
        }

        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| SignerError::SigningError(format!("HMAC error: {}", e)))?;
        mac.update(salt.as_bytes());
        mac.update(b"signer");

        Ok(Self {
            key: mac.finalize().into_bytes().to_vec(),
        })
    }

    /// Sign `value` stamped with `issued_at` (unix seconds).
    pub fn sign(&self, value: &str, issued_at: i64) -> Result<String, SignerError> {
        let payload = format!("{}{}{}", value, SEPARATOR, issued_at);
        let mac = self.mac(&payload)?;
        Ok(format!(
            "{}{}{}",
            payload,
            SEPARATOR,
            URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
        ))
    }

    /// Verify `token` and return the signed value.
    ///
    /// The MAC comparison is constant time. With `max_age` set, tokens issued
    /// more than `max_age` seconds before `now` are rejected.
    pub fn unsign(&self, token: &str, now: i64, max_age: Option<i64>) -> Result<String, TokenRejection> {
        let mut parts = token.rsplitn(3, SEPARATOR);
        let (signature, issued_at, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(s), Some(t), Some(v)) if !s.is_empty() && !v.is_empty() => (s, t, v),
            _ => return Err(TokenRejection::Malformed),
        };

        let payload = &token[..token.len() - signature.len() - 1];
        let issued_at: i64 = issued_at.parse().map_err(|_| TokenRejection::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenRejection::Malformed)?;

        let mac = self.mac(payload).map_err(|_| TokenRejection::BadSignature)?;
        mac.verify_slice(&signature)
            .map_err(|_| TokenRejection::BadSignature)?;

        if let Some(max_age) = max_age {
            if issued_at.saturating_add(max_age) < now {
                return Err(TokenRejection::Expired);
            }
        }

        Ok(value.to_string())
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256, SignerError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| SignerError::SigningError(format!("HMAC error: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn signer() -> TimedSigner {
        TimedSigner::new(SECRET, "test-salt", 32).unwrap()
    }

    #[test]
    fn test_sign_and_unsign() {
        let signer = signer();
        let token = signer.sign("abc_DEF-123", 1_000).unwrap();
        assert!(token.starts_with("abc_DEF-123.1000."));
        assert_eq!(signer.unsign(&token, 1_010, Some(60)).unwrap(), "abc_DEF-123");
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = TimedSigner::new(b"short", "salt", 32).unwrap_err();
        assert!(matches!(err, SignerError::SecretTooShort { min: 32, actual: 5 }));
    }

    #[test]
    fn test_expired_token() {
        let signer = signer();
        let token = signer.sign("value", 1_000).unwrap();
        assert_eq!(signer.unsign(&token, 1_061, Some(60)), Err(TokenRejection::Expired));
        assert!(signer.unsign(&token, 1_061, None).is_ok());
    }

    #[test]
    fn test_malformed_tokens() {
        let signer = signer();
        for token in ["", "abc", "abc.def", ".1000.sig", "abc.notanumber.sig", "abc.1000."] {
            assert!(signer.unsign(token, 1_000, None).is_err(), "accepted {:?}", token);
        }
        assert_eq!(
            signer.unsign("abc123.badsignature", 0, None),
            Err(TokenRejection::Malformed)
        );
    }

    #[test]
    fn test_tampered_value_rejected() {
        let signer = signer();
        let token = signer.sign("value", 1_000).unwrap();
        let tampered = token.replacen("value", "valuf", 1);
        assert_eq!(signer.unsign(&tampered, 1_000, None), Err(TokenRejection::BadSignature));

        let restamped = token.replacen(".1000.", ".9000.", 1);
        assert_eq!(signer.unsign(&restamped, 1_000, None), Err(TokenRejection::BadSignature));
    }

    #[test]
    fn test_salt_separates_signers() {
        let a = TimedSigner::new(SECRET, "salt-a", 32).unwrap();
        let b = TimedSigner::new(SECRET, "salt-b", 32).unwrap();
        let token = a.sign("value", 1_000).unwrap();
        assert_eq!(b.unsign(&token, 1_000, None), Err(TokenRejection::BadSignature));
    }
}
