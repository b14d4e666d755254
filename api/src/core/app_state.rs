use scan_orchestrator::{ScanPipeline, ServiceConfig};

use crate::error_handler::AppResult;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline cloned into every detached scan task.
    pub pipeline: ScanPipeline,
}

impl AppState {
    /// Load shared state from environment variables.
    pub fn from_env() -> AppResult<Self> {
        let config = ServiceConfig::from_env()?;
        Self::from_config(config)
    }

    pub fn from_config(config: ServiceConfig) -> AppResult<Self> {
        Ok(Self {
            pipeline: ScanPipeline::new(config)?,
        })
    }
}
