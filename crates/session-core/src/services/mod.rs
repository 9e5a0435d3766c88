//! Session services (lifecycle orchestration)

pub mod session_handle;
pub mod session_manager;

pub use session_handle::SessionHandle;
pub use session_manager::{SessionManager, SessionOutcome};
