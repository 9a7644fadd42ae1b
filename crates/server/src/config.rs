use ingest::IngestConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use store::BackendConfig;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB (bounds a whole multipart upload)
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address prefixed to stored image paths in `GET /images`
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Directory uploaded files are written to and served from
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Maximum files per upload request
    #[serde(default = "default_max_upload_files")]
    pub max_upload_files: usize,

    /// Document storage backend
    #[serde(default)]
    pub storage: BackendConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            public_base_url: default_public_base_url(),
            upload_dir: default_upload_dir(),
            max_upload_files: default_max_upload_files(),
            storage: BackendConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("ANNOTATOR_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.ingest_config().validate()?;

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    /// Ingest settings derived from the upload fields. Files are always
    /// served under `/uploads`.
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            content_root: self.upload_dir.clone(),
            max_files: self.max_upload_files,
            ..IngestConfig::default()
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_files() -> usize {
    10
}
