//! # Session API
//! 
//! HTTP integration: session middleware, extractor, handlers and router.

pub mod error;
pub mod extractor;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use extractor::Session;
pub use router::router;
pub use state::AppState;
