use std::sync::Arc;

use crate::observability::AppMetrics;
use crate::services::chat::ChatService;
use crate::services::session::SessionService;
use crate::storage::SessionStore;

/// Application state containing all shared services
#[derive(Clone)]
pub struct AppState {
    /// Session store
    pub store: Arc<dyn SessionStore>,
    /// Session service for lifecycle operations
    pub session_service: Arc<dyn SessionService>,
    /// Chat service for question orchestration
    pub chat_service: Arc<dyn ChatService>,
    /// Application metrics
    pub metrics: AppMetrics,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &"Arc<dyn SessionStore>")
            .field("session_service", &"Arc<dyn SessionService>")
            .field("chat_service", &"Arc<dyn ChatService>")
            .field("metrics", &"AppMetrics")
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: Arc<dyn SessionStore>,
        session_service: Box<dyn SessionService>,
        chat_service: Box<dyn ChatService>,
        metrics: AppMetrics,
    ) -> Self {
        Self {
            store,
            session_service: Arc::from(session_service),
            chat_service: Arc::from(chat_service),
            metrics,
        }
    }
}
