//! Signed cookie transport
//!
//! The cookie value is `<id>.<issued_at>.<mac>`, produced by
//! [`TimedSigner`]. Any cookie that fails verification is ignored as if it had
//! not been sent.

use std::sync::Arc;
use std::time::Duration;

use cookie::{Cookie, SameSite};
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use session_core::{Clock, SessionId, SessionTransport, SystemClock, TransportError};
use session_security::TimedSigner;
use session_shared::constants::MIN_SECRET_LENGTH;
use time::OffsetDateTime;
use tracing::debug;

/// Attributes written with every session cookie.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl CookieOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse `strict`, `lax` or `none`.
    pub fn parse_same_site(value: &str) -> Result<SameSite, TransportError> {
        match value.trim().to_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(TransportError::Misconfigured(format!("unknown same_site value: {}", other))),
        }
    }
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: session_shared::constants::DEFAULT_COOKIE_NAME.to_string(),
            path: session_shared::constants::DEFAULT_COOKIE_PATH.to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

pub struct SignedCookieTransport {
    signer: TimedSigner,
    options: CookieOptions,
    /// Oldest signature accepted on extract
    max_age: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SignedCookieTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedCookieTransport")
            .field("options", &self.options)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

impl SignedCookieTransport {
    /// Fails when the secret is shorter than the minimum length; a session
    /// that cannot be signed must not be sent at all.
    pub fn new(
        secret: &[u8],
        salt: &str,
        options: CookieOptions,
        max_age: Duration,
    ) -> Result<Self, TransportError> {
        if options.name.is_empty() {
            return Err(TransportError::Misconfigured("cookie name is empty".into()));
        }
        if options.same_site == SameSite::None && !options.secure {
            return Err(TransportError::Misconfigured(
                "same_site=none requires a secure cookie".into(),
            ));
        }
        let signer = TimedSigner::new(secret, salt, MIN_SECRET_LENGTH)
            .map_err(|e| TransportError::Misconfigured(e.to_string()))?;

        Ok(Self {
            signer,
            options,
            max_age,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.options.name
    }

    fn base_cookie(&self, value: String) -> cookie::CookieBuilder<'static> {
        let mut builder = Cookie::build((self.options.name.clone(), value))
            .path(self.options.path.clone())
            .secure(self.options.secure)
            .http_only(self.options.http_only)
            .same_site(self.options.same_site);
        if let Some(domain) = &self.options.domain {
            builder = builder.domain(domain.clone());
        }
        builder
    }

    fn append(headers: &mut HeaderMap, cookie: Cookie<'_>) -> Result<(), TransportError> {
        let value = HeaderValue::from_str(&cookie.to_string())
            .map_err(|e| TransportError::Encoding(e.to_string()))?;
        headers.append(SET_COOKIE, value);
        Ok(())
    }

    /// First cookie named like ours across every `Cookie` header.
    fn find_token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == self.options.name)
            .map(|c| c.value().to_string())
    }
}

impl SessionTransport for SignedCookieTransport {
    fn extract(&self, headers: &HeaderMap) -> Option<SessionId> {
        let token = self.find_token(headers)?;
        let now = self.clock.now().timestamp();
        let max_age = i64::try_from(self.max_age.as_secs()).ok();

        match self.signer.unsign(&token, now, max_age) {
            Ok(id) => Some(SessionId::from_raw(id)),
            Err(rejection) => {
                debug!("Ignoring session cookie: {}", rejection);
                None
            }
        }
    }

    fn encode(&self, headers: &mut HeaderMap, id: &SessionId, ttl: Duration) -> Result<(), TransportError> {
        let now = self.clock.now();
        let token = self
            .signer
            .sign(id.as_str(), now.timestamp())
            .map_err(|e| TransportError::Encoding(e.to_string()))?;

        let secs = i64::try_from(ttl.as_secs())
            .map_err(|_| TransportError::Encoding("ttl out of range".into()))?;
        let expires = OffsetDateTime::from_unix_timestamp(now.timestamp().saturating_add(secs))
            .map_err(|e| TransportError::Encoding(e.to_string()))?;

        let cookie = self
            .base_cookie(token)
            .max_age(time::Duration::seconds(secs))
            .expires(expires)
            .build();
        Self::append(headers, cookie)
    }

    fn clear(&self, headers: &mut HeaderMap) -> Result<(), TransportError> {
        let cookie = self
            .base_cookie(String::new())
            .max_age(time::Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build();
        Self::append(headers, cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use session_core::ManualClock;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn clock_at(secs: i64) -> Arc<ManualClock> {
        Arc::new(ManualClock::new(DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()))
    }

    fn transport(clock: Arc<ManualClock>) -> SignedCookieTransport {
        SignedCookieTransport::new(SECRET, "test-salt", CookieOptions::new("sid"), Duration::from_secs(60))
            .unwrap()
            .with_clock(clock)
    }

    fn set_cookie(headers: &HeaderMap) -> Cookie<'static> {
        let raw = headers.get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
        Cookie::parse(raw).unwrap()
    }

    fn request_with(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_encode_then_extract() {
        let transport = transport(clock_at(0));
        let id = SessionId::generate(32);

        let mut response = HeaderMap::new();
        transport.encode(&mut response, &id, Duration::from_secs(60)).unwrap();
        let cookie = set_cookie(&response);

        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(60)));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert!(cookie.value().starts_with(id.as_str()));

        let request = request_with(&format!("theme=dark; sid={}", cookie.value()));
        assert_eq!(transport.extract(&request), Some(id));
    }

    #[test]
    fn test_expiry_metadata_matches_ttl() {
        let transport = transport(clock_at(0));
        let mut response = HeaderMap::new();
        transport
            .encode(&mut response, &SessionId::generate(32), Duration::from_secs(15))
            .unwrap();
        let cookie = set_cookie(&response);

        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(15)));
        let expires = cookie.expires_datetime().unwrap();
        assert_eq!(expires.unix_timestamp(), 1_700_000_015);
    }

    #[test]
    fn test_missing_and_foreign_cookies_are_ignored() {
        let transport = transport(clock_at(0));
        assert_eq!(transport.extract(&HeaderMap::new()), None);
        assert_eq!(transport.extract(&request_with("other=1")), None);
        assert_eq!(transport.extract(&request_with("sid=abc123.badsignature")), None);
        assert_eq!(transport.extract(&request_with("sid=")), None);
    }

    #[test]
    fn test_tampered_cookie_is_ignored() {
        let transport = transport(clock_at(0));
        let mut response = HeaderMap::new();
        transport
            .encode(&mut response, &SessionId::generate(32), Duration::from_secs(60))
            .unwrap();
        let value = set_cookie(&response).value().to_string();

        let mut bytes = value.into_bytes();
        bytes[0] = if bytes[0] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(transport.extract(&request_with(&format!("sid={}", tampered))), None);
    }

    #[test]
    fn test_every_single_bit_flip_is_rejected() {
        let transport = transport(clock_at(0));
        let mut response = HeaderMap::new();
        transport
            .encode(&mut response, &SessionId::generate(32), Duration::from_secs(60))
            .unwrap();
        let value = set_cookie(&response).value().to_string();

        let mut tried = 0;
        for index in 0..value.len() {
            for bit in 0..8 {
                let mut bytes = value.clone().into_bytes();
                bytes[index] ^= 1 << bit;
                let mut raw = b"sid=".to_vec();
                raw.extend_from_slice(&bytes);

                // Bytes that cannot travel in a header never reach extract
                let Ok(header) = HeaderValue::from_bytes(&raw) else {
                    continue;
                };
                let mut request = HeaderMap::new();
                request.insert(COOKIE, header);
                assert_eq!(
                    transport.extract(&request),
                    None,
                    "flipping bit {} of byte {} was accepted",
                    bit,
                    index
                );
                tried += 1;
            }
        }
        assert!(tried > value.len() * 4);
    }

    #[test]
    fn test_cookie_signed_with_other_secret_is_ignored() {
        let other = SignedCookieTransport::new(
            b"ffffffffffffffffffffffffffffffff",
            "test-salt",
            CookieOptions::new("sid"),
            Duration::from_secs(60),
        )
        .unwrap()
        .with_clock(clock_at(0));
        let mut response = HeaderMap::new();
        other
            .encode(&mut response, &SessionId::generate(32), Duration::from_secs(60))
            .unwrap();
        let value = set_cookie(&response).value().to_string();

        let transport = transport(clock_at(0));
        assert_eq!(transport.extract(&request_with(&format!("sid={}", value))), None);
    }

    #[test]
    fn test_stale_signature_is_ignored() {
        let clock = clock_at(0);
        let transport = transport(clock.clone());
        let mut response = HeaderMap::new();
        transport
            .encode(&mut response, &SessionId::generate(32), Duration::from_secs(60))
            .unwrap();
        let request = request_with(&format!("sid={}", set_cookie(&response).value()));

        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(transport.extract(&request), None);
    }

    #[test]
    fn test_clear_expires_cookie() {
        let transport = transport(clock_at(0));
        let mut response = HeaderMap::new();
        transport.clear(&mut response).unwrap();
        let cookie = set_cookie(&response);

        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }

    #[test]
    fn test_domain_is_written() {
        let options = CookieOptions {
            domain: Some("example.com".into()),
            ..CookieOptions::new("sid")
        };
        let transport = SignedCookieTransport::new(SECRET, "test-salt", options, Duration::from_secs(60)).unwrap();
        let mut response = HeaderMap::new();
        transport
            .encode(&mut response, &SessionId::generate(32), Duration::from_secs(60))
            .unwrap();
        assert_eq!(set_cookie(&response).domain(), Some("example.com"));
    }

    #[test]
    fn test_misconfiguration_is_rejected() {
        let short = SignedCookieTransport::new(b"short", "salt", CookieOptions::new("sid"), Duration::from_secs(60));
        assert!(matches!(short, Err(TransportError::Misconfigured(_))));

        let insecure = CookieOptions {
            secure: false,
            same_site: SameSite::None,
            ..CookieOptions::new("sid")
        };
        let result = SignedCookieTransport::new(SECRET, "salt", insecure, Duration::from_secs(60));
        assert!(matches!(result, Err(TransportError::Misconfigured(_))));

        assert!(CookieOptions::parse_same_site("Strict").is_ok());
        assert!(CookieOptions::parse_same_site("sometimes").is_err());
    }
}
