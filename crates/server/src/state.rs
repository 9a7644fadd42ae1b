use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use ingest::ImageIngestor;
use std::sync::Arc;
use store::{DocumentBackend, Stores};

/// Shared application state
///
/// Built once at startup and handed to every handler through axum's `State`
/// extractor; the backend client inside is reused by all requests.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Writes uploaded files under the content root
    pub ingestor: Arc<ImageIngestor>,

    /// Credential, image and annotation stores over one backend
    pub stores: Stores,
}

impl ServerState {
    /// Create new server state, building the configured storage backend
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let backend = config
            .storage
            .build()
            .await
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Self::with_backend(config, backend)
    }

    /// Create server state over an already-built backend
    pub fn with_backend(
        config: ServerConfig,
        backend: Arc<dyn DocumentBackend>,
    ) -> ServerResult<Self> {
        let ingestor = ImageIngestor::new(config.ingest_config())
            .map_err(|e| ServerError::Config(e.to_string()))?;
        let stores = Stores::new(backend, config.public_base_url.clone());

        Ok(Self {
            config: Arc::new(config),
            ingestor: Arc::new(ingestor),
            stores,
        })
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}
