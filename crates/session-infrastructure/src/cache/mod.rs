//! Session store implementations

pub mod memory;
pub mod redis;

pub use self::memory::{MemorySessionStore, MemoryStoreStats};
pub use self::redis::RedisSessionStore;
