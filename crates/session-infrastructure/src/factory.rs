//! Session wiring from application configuration

use std::sync::Arc;
use std::time::Duration;

use session_core::{
    RotationPolicy, SessionConfig, SessionError, SessionManager, SessionStore, TransportError,
    VerifierPipeline,
};
use session_shared::config::{AppConfig, CookieSettings, SessionSettings};
use tracing::info;

use crate::cache::{MemorySessionStore, RedisSessionStore};
use crate::transport::{CookieOptions, SignedCookieTransport};

/// Everything the HTTP layer needs to serve sessions.
pub struct SessionComponents {
    pub manager: Arc<SessionManager>,
    /// Present when the in-memory backend is selected, for sweeping and stats
    pub memory_store: Option<MemorySessionStore>,
}

pub fn session_config(settings: &SessionSettings) -> Result<SessionConfig, SessionError> {
    let config = SessionConfig::new(Duration::from_secs(settings.ttl_seconds))
        .with_expiry(settings.expiry.parse()?)
        .with_id_bytes(settings.id_bytes)
        .with_rotation(settings.rotation.parse::<RotationPolicy>()?);
    config.validate()?;
    Ok(config)
}

pub fn cookie_transport(settings: &CookieSettings, ttl: Duration) -> Result<SignedCookieTransport, TransportError> {
    let options = CookieOptions {
        name: settings.name.clone(),
        path: settings.path.clone(),
        domain: settings.domain.clone().filter(|d| !d.is_empty()),
        secure: settings.secure,
        http_only: settings.http_only,
        same_site: CookieOptions::parse_same_site(&settings.same_site)?,
    };
    SignedCookieTransport::new(settings.secret.as_bytes(), &settings.salt, options, ttl)
}

pub fn verifier_pipeline(settings: &SessionSettings) -> Result<VerifierPipeline, SessionError> {
    VerifierPipeline::from_names(settings.verifiers.as_slice())
}

/// Build the session manager with the configured backend.
///
/// The Redis backend is connected here, so an unreachable server fails
/// startup instead of the first request.
pub async fn build_session_manager(config: &AppConfig) -> Result<SessionComponents, SessionError> {
    let settings = &config.session;
    let session_config = session_config(settings)?;
    let transport = cookie_transport(&settings.cookie, session_config.ttl)?;
    let pipeline = verifier_pipeline(settings)?;

    let (store, memory_store) = match settings.backend.trim().to_lowercase().as_str() {
        "memory" => {
            let store = MemorySessionStore::new();
            (Arc::new(store.clone()) as Arc<dyn SessionStore>, Some(store))
        }
        "redis" => {
            let store = RedisSessionStore::connect(&config.redis.url, config.redis.key_prefix.clone()).await?;
            (Arc::new(store) as Arc<dyn SessionStore>, None)
        }
        other => {
            return Err(SessionError::InvalidConfig(format!("unknown session backend: {}", other)));
        }
    };

    info!("Session backend: {}", settings.backend);
    let manager = SessionManager::new(store, Arc::new(transport), pipeline, session_config)?;

    Ok(SessionComponents {
        manager: Arc::new(manager),
        memory_store,
    })
}
