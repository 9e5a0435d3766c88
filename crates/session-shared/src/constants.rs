//! Application-wide constants

pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
pub const DEFAULT_COOKIE_NAME: &str = "session";
pub const DEFAULT_COOKIE_PATH: &str = "/";
pub const DEFAULT_SIGNER_SALT: &str = "modular-sessions.cookie";
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "session:";
pub const DEFAULT_ID_BYTES: usize = 32;
pub const MIN_ID_BYTES: usize = 16;
pub const MIN_SECRET_LENGTH: usize = 32;
pub const MAX_ID_GENERATION_ATTEMPTS: usize = 3;
pub const REDACTED_PREFIX_LEN: usize = 6;
