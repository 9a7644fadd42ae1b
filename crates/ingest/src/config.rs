//! Configuration types for image ingestion.
//!
//! [`IngestConfig`] decides where uploaded files land, how they are named and
//! which URL prefix their reference paths carry. It is cheap to clone and
//! deserializes from any format the `config`/`serde` stack understands.
//!
//! # Quick Start
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig::default();
//! assert!(config.validate().is_ok());
//! ```
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime configuration for image ingestion.
///
/// # Serialization
///
/// ```json
/// {
///   "content_root": "uploads",
///   "url_prefix": "/uploads",
///   "name_prefix": "img",
///   "max_files": 10
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory uploaded files are written to. Created on first use.
    ///
    /// Default: `uploads`
    pub content_root: PathBuf,

    /// URL path under which the content root is served. Reference paths are
    /// `<url_prefix>/<file name>`.
    ///
    /// Default: `/uploads`
    pub url_prefix: String,

    /// Leading part of every generated file name, followed by a millisecond
    /// timestamp and the original extension.
    ///
    /// Default: `img`
    pub name_prefix: String,

    /// Upper bound on files accepted by a single [`store`](crate::ImageIngestor::store) call.
    ///
    /// Default: `10`
    pub max_files: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("uploads"),
            url_prefix: "/uploads".into(),
            name_prefix: "img".into(),
            max_files: 10,
        }
    }
}

impl IngestConfig {
    /// Returns a default configuration rooted at `content_root`.
    pub fn with_content_root(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            ..Self::default()
        }
    }

    /// Validates internal consistency of this configuration.
    ///
    /// Meant to be called once at start-up; performs no I/O.
    ///
    /// ```rust
    /// use ingest::{ConfigError, IngestConfig};
    ///
    /// let bad = IngestConfig {
    ///     max_files: 0,
    ///     ..Default::default()
    /// };
    /// assert_eq!(bad.validate(), Err(ConfigError::ZeroMaxFiles));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_files == 0 {
            return Err(ConfigError::ZeroMaxFiles);
        }
        if !self.url_prefix.starts_with('/') {
            return Err(ConfigError::InvalidUrlPrefix(self.url_prefix.clone()));
        }
        if self.name_prefix.contains(['/', '\\']) || self.name_prefix.contains("..") {
            return Err(ConfigError::InvalidNamePrefix(self.name_prefix.clone()));
        }
        if self.content_root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyContentRoot);
        }
        Ok(())
    }

    /// Builds the public reference path for a stored file name.
    pub fn reference_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), file_name)
    }
}

/// Errors raised by [`IngestConfig::validate`].
///
/// These are start-up problems, not request-time failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// `max_files` is zero, so no upload could ever succeed.
    #[error("max_files must be at least 1")]
    ZeroMaxFiles,

    /// The URL prefix is not an absolute URL path.
    #[error("url_prefix must start with '/': {0:?}")]
    InvalidUrlPrefix(String),

    /// The name prefix would escape the content root.
    #[error("name_prefix must not contain path separators: {0:?}")]
    InvalidNamePrefix(String),

    /// No content root was configured.
    #[error("content_root must not be empty")]
    EmptyContentRoot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = IngestConfig::default();
        assert_eq!(cfg.max_files, 10);
        assert_eq!(cfg.url_prefix, "/uploads");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_relative_url_prefix() {
        let cfg = IngestConfig {
            url_prefix: "uploads".into(),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidUrlPrefix(_))
        ));
    }

    #[test]
    fn rejects_name_prefix_with_separator() {
        let cfg = IngestConfig {
            name_prefix: "../img".into(),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidNamePrefix(_))
        ));
    }

    #[test]
    fn reference_joins_prefix_and_name() {
        let mut cfg = IngestConfig::default();
        assert_eq!(cfg.reference_for("img1.png"), "/uploads/img1.png");

        cfg.url_prefix = "/static/".into();
        assert_eq!(cfg.reference_for("img1.png"), "/static/img1.png");
    }
}
