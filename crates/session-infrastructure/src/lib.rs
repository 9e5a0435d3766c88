//! # Session Infrastructure
//! 
//! Store and transport implementations (adapters), plus wiring from
//! application configuration.

pub mod cache;
pub mod factory;
pub mod transport;

pub use cache::{MemorySessionStore, MemoryStoreStats, RedisSessionStore};
pub use factory::{build_session_manager, cookie_transport, session_config, verifier_pipeline, SessionComponents};
pub use transport::{CookieOptions, SignedCookieTransport};
