//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH, DEFAULT_ID_BYTES, DEFAULT_REDIS_KEY_PREFIX,
    DEFAULT_SESSION_TTL_SECS, DEFAULT_SIGNER_SALT, MIN_SECRET_LENGTH,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub session: SessionSettings,
    pub redis: RedisSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub ttl_seconds: u64,
    /// "sliding" or "absolute"
    pub expiry: String,
    pub id_bytes: usize,
    /// "preserve" or "reset" the creation time on identifier rotation
    pub rotation: String,
    /// "memory" or "redis"
    pub backend: String,
    /// 0 disables the in-memory sweeper
    pub sweep_interval_seconds: u64,
    pub verifiers: Vec<String>,
    pub cookie: CookieSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secret: String,
    pub salt: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    /// "strict", "lax" or "none"
    pub same_site: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
    pub key_prefix: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config: Self = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("session.verifiers")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an in-memory TOML document on top of the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let config: Self = Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that do not need the session crates. Policy names are parsed
    /// where they are used.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.session.cookie.secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::invalid(
                "session.cookie.secret",
                format!("must be at least {} bytes", MIN_SECRET_LENGTH),
            ));
        }
        if self.session.cookie.name.trim().is_empty() {
            return Err(AppError::invalid("session.cookie.name", "must not be empty"));
        }
        if !matches!(self.session.backend.as_str(), "memory" | "redis") {
            return Err(AppError::invalid(
                "session.backend",
                format!("unknown backend '{}'", self.session.backend),
            ));
        }
        Ok(())
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "session-server")?
            .set_default("session.ttl_seconds", DEFAULT_SESSION_TTL_SECS)?
            .set_default("session.expiry", "sliding")?
            .set_default("session.id_bytes", DEFAULT_ID_BYTES as u64)?
            .set_default("session.rotation", "preserve")?
            .set_default("session.backend", "memory")?
            .set_default("session.sweep_interval_seconds", 60)?
            .set_default("session.verifiers", Vec::<String>::new())?
            .set_default("session.cookie.name", DEFAULT_COOKIE_NAME)?
            .set_default("session.cookie.salt", DEFAULT_SIGNER_SALT)?
            .set_default("session.cookie.path", DEFAULT_COOKIE_PATH)?
            .set_default("session.cookie.secure", true)?
            .set_default("session.cookie.http_only", true)?
            .set_default("session.cookie.same_site", "lax")?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("redis.key_prefix", DEFAULT_REDIS_KEY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_toml_str(
            r#"
            [session.cookie]
            secret = "0123456789abcdef0123456789abcdef"
            "#,
        )
        .unwrap();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.session.ttl_seconds, DEFAULT_SESSION_TTL_SECS);
        assert_eq!(config.session.expiry, "sliding");
        assert_eq!(config.session.backend, "memory");
        assert_eq!(config.session.cookie.name, DEFAULT_COOKIE_NAME);
        assert!(config.session.cookie.domain.is_none());
        assert!(config.session.verifiers.is_empty());
        assert_eq!(config.redis.key_prefix, DEFAULT_REDIS_KEY_PREFIX);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_toml_str(
            r#"
            [session]
            ttl_seconds = 60
            expiry = "absolute"
            verifiers = ["user_agent", "client_ip"]

            [session.cookie]
            name = "sid"
            secret = "0123456789abcdef0123456789abcdef"
            domain = "example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.session.ttl_seconds, 60);
        assert_eq!(config.session.expiry, "absolute");
        assert_eq!(config.session.verifiers, vec!["user_agent", "client_ip"]);
        assert_eq!(config.session.cookie.name, "sid");
        assert_eq!(config.session.cookie.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        assert!(matches!(AppConfig::from_toml_str(""), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let short = AppConfig::from_toml_str("[session.cookie]\nsecret = \"short\"\n");
        assert!(matches!(short, Err(AppError::InvalidSetting { .. })));

        let backend = AppConfig::from_toml_str(
            "[session]\nbackend = \"floppy\"\n[session.cookie]\nsecret = \"0123456789abcdef0123456789abcdef\"\n",
        );
        assert!(matches!(backend, Err(AppError::InvalidSetting { .. })));
    }
}
