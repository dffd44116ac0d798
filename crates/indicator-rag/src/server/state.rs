//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::service::RagService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    service: Arc<RagService>,
}

impl AppState {
    /// Build state with the default Ollama-backed service
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing RAG application state...");
        Ok(Self::from_service(Arc::new(RagService::from_config(config)?)))
    }

    /// Wrap an already wired service
    pub fn from_service(service: Arc<RagService>) -> Self {
        Self { service }
    }

    /// The RAG service
    pub fn service(&self) -> &Arc<RagService> {
        &self.service
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        self.service.config()
    }
}
