//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{Renderer, SyncSession};
use crate::config::Settings;
use crate::infrastructure::http::HttpTreeService;
use crate::infrastructure::traits::TreeService;
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Remote tree service
    pub tree_service: Arc<dyn TreeService>,
}

impl ServiceContainer {
    /// Create a new service container talking HTTP to `settings.server_url`.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let http = HttpTreeService::new(&settings.server_url, settings.request_timeout())?;
        Ok(Self::with_deps(settings, Arc::new(http)))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, tree_service: Arc<dyn TreeService>) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            tree_service,
        }
    }

    /// Fresh session on the configured tree kind.
    pub fn session(&self) -> SyncSession {
        SyncSession::new(self.tree_service.clone(), self.settings.tree_kind.clone())
    }

    pub fn renderer(&self) -> Renderer {
        self.settings.renderer()
    }
}
