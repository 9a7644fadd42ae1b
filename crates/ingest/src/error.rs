//! Error types produced by the ingest crate.
//!
//! | Error | Category | HTTP |
//! |-------|----------|------|
//! | [`NoFiles`](IngestError::NoFiles) | Validation | 400 |
//! | [`TooManyFiles`](IngestError::TooManyFiles) | Validation | 400 |
//! | [`Io`](IngestError::Io) | Filesystem | 500 |
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while storing or removing uploaded files.
///
/// ```rust
/// use ingest::IngestError;
///
/// let err = IngestError::NoFiles;
/// assert_eq!(err.to_string(), "no files uploaded");
/// assert!(err.is_client_error());
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IngestError {
    /// The upload carried no files at all.
    #[error("no files uploaded")]
    NoFiles,

    /// More files than [`IngestConfig::max_files`](crate::IngestConfig::max_files).
    #[error("too many files: got {got}, at most {max} allowed")]
    TooManyFiles {
        /// Configured limit.
        max: usize,
        /// Number of files in the request.
        got: usize,
    },

    /// Creating the content root or writing a file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        /// Path that was being created or written.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the caller sent something we refuse to store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, IngestError::NoFiles | IngestError::TooManyFiles { .. })
    }
}
