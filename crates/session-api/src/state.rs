use std::sync::Arc;

use session_core::SessionManager;
use session_infrastructure::MemorySessionStore;
use session_shared::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    /// Set with the in-memory backend, for health stats
    pub memory_store: Option<MemorySessionStore>,
    pub config: AppConfig,
}
