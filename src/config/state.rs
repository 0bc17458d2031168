// Application state module
// Read-only state shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::storage::StorageGateway;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Provider client; the only way handlers reach the storage account
    pub gateway: Arc<dyn StorageGateway>,
}

impl AppState {
    pub fn new(config: Config, gateway: Arc<dyn StorageGateway>) -> Self {
        Self { config, gateway }
    }
}
