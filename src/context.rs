use crate::config::AppConfig;
use crate::core::BackupServer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub server: Arc<dyn BackupServer>,
}

impl AppContext {
    pub fn new(config: AppConfig, server: Arc<dyn BackupServer>) -> Self {
        Self {
            config: Arc::new(config),
            server,
        }
    }
}
