use std::sync::Arc;

use crate::auth::JwtAuth;
use crate::config::AppConfig;
use crate::database::TodoStore;
use crate::services::TodoService;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoService,
    pub auth: JwtAuth,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, config: AppConfig) -> Self {
        Self {
            todos: TodoService::new(store, config.filter.clone()),
            auth: JwtAuth::from_config(&config.security),
            config: Arc::new(config),
        }
    }
}
