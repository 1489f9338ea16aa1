use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::database::DrinkStore;
use crate::middleware::PermissionGuard;
use crate::types::Permission;

/// Shared handles passed to every handler; built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DrinkStore>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DrinkStore>, verifier: TokenVerifier) -> Self {
        Self {
            config: Arc::new(config),
            store,
            verifier: Arc::new(verifier),
        }
    }

    /// Middleware state for a route that needs `permission`
    pub fn guard(&self, permission: Permission) -> PermissionGuard {
        PermissionGuard::new(self.verifier.clone(), permission)
    }
}
