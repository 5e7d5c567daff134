use anyhow::Result;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::BackupServer;

pub mod rest;
mod simulated;

pub use rest::{RestBackupServer, RestSettings};
pub use simulated::SimulatedServer;

pub fn get_server(config: &AppConfig) -> Result<Arc<dyn BackupServer>> {
    if config.simulation {
        tracing::info!("(Simulator) Using the simulated backup server");
        return Ok(Arc::new(SimulatedServer::demo()));
    }

    Ok(Arc::new(RestBackupServer::new(config.rest_settings())?))
}
