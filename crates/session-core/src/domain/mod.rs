//! # Session Core - Domain Module
//! 
//! Session identifiers, records and the read-only request context.

pub mod session_id;
pub mod session_record;
pub mod request_context;

pub use session_id::SessionId;
pub use session_record::{SessionData, SessionRecord};
pub use request_context::{RequestContext, VerifyContext};
