//! Session transports

pub mod signed_cookie;

pub use signed_cookie::{CookieOptions, SignedCookieTransport};
