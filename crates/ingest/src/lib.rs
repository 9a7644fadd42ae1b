//! Image ingestion
//!
//! Uploaded images enter the system here. We take the raw files a client sent,
//! write each one under the content root with a generated name, and hand back
//! the reference path the rest of the system stores instead of the bytes.
//!
//! ## What we do here
//!
//! - **Enforce the file count** - at least one file, at most
//!   [`IngestConfig::max_files`].
//! - **Name files** - `img<unix millis><original extension>`. Names are
//!   claimed with create-new semantics; a taken name bumps the timestamp, so
//!   files from the same millisecond never overwrite each other.
//! - **Clean up after ourselves** - if one write fails, files already written
//!   by the same call are removed before the error is returned.
//!
//! ## Example
//!
//! ```no_run
//! use ingest::{ImageIngestor, IngestConfig, UploadedFile};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ingestor = ImageIngestor::new(IngestConfig::default())?;
//! let refs = ingestor
//!     .store(vec![UploadedFile::new("cat.png", vec![0x89, 0x50])])
//!     .await?;
//! assert!(refs[0].url.starts_with("/uploads/img"));
//! # Ok(())
//! # }
//! ```
use std::io::ErrorKind;
use std::time::Instant;

use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

mod config;
mod error;
mod types;

pub use crate::config::{ConfigError, IngestConfig};
pub use crate::error::IngestError;
pub use crate::types::{ImageRef, UploadedFile};

/// Give up on naming a file after this many taken candidates.
const MAX_NAME_ATTEMPTS: u32 = 1024;

/// Writes uploaded files under a content root.
#[derive(Debug, Clone)]
pub struct ImageIngestor {
    config: IngestConfig,
}

impl ImageIngestor {
    /// Creates an ingestor after validating `config`. Performs no I/O.
    pub fn new(config: IngestConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Creates the content root if it does not exist yet.
    pub async fn ensure_content_root(&self) -> Result<(), IngestError> {
        let root = &self.config.content_root;
        fs::create_dir_all(root)
            .await
            .map_err(|err| IngestError::io(root, err))
    }

    /// Stores every file and returns one [`ImageRef`] per input, in order.
    pub async fn store(&self, files: Vec<UploadedFile>) -> Result<Vec<ImageRef>, IngestError> {
        let start = Instant::now();
        if files.is_empty() {
            return Err(IngestError::NoFiles);
        }
        if files.len() > self.config.max_files {
            return Err(IngestError::TooManyFiles {
                max: self.config.max_files,
                got: files.len(),
            });
        }

        self.ensure_content_root().await?;

        let mut stored = Vec::with_capacity(files.len());
        let mut next_stamp = 0i64;
        for file in &files {
            match self.write_unique(file, &mut next_stamp).await {
                Ok(image) => stored.push(image),
                Err(err) => {
                    warn!(
                        error = %err,
                        written = stored.len(),
                        requested = files.len(),
                        "ingest_failure"
                    );
                    self.remove(&stored).await;
                    return Err(err);
                }
            }
        }

        info!(
            count = stored.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "ingest_success"
        );
        Ok(stored)
    }

    /// Best-effort removal of previously stored files. Files that are
    /// already gone are skipped silently.
    pub async fn remove(&self, images: &[ImageRef]) {
        for image in images {
            match fs::remove_file(&image.path).await {
                Ok(()) => debug!(file = %image.file_name, "removed stored image"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(file = %image.file_name, error = %err, "failed to remove stored image")
                }
            }
        }
    }

    async fn write_unique(
        &self,
        file: &UploadedFile,
        next_stamp: &mut i64,
    ) -> Result<ImageRef, IngestError> {
        let extension = file.extension();
        let mut stamp = Utc::now().timestamp_millis().max(*next_stamp);

        for _ in 0..MAX_NAME_ATTEMPTS {
            let file_name = format!("{}{}{}", self.config.name_prefix, stamp, extension);
            let path = self.config.content_root.join(&file_name);

            let mut handle = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(handle) => handle,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    stamp += 1;
                    continue;
                }
                Err(err) => return Err(IngestError::io(path, err)),
            };

            let written = async {
                handle.write_all(&file.bytes).await?;
                handle.flush().await
            }
            .await;
            if let Err(err) = written {
                drop(handle);
                let _ = fs::remove_file(&path).await;
                return Err(IngestError::io(path, err));
            }

            *next_stamp = stamp + 1;
            return Ok(ImageRef {
                url: self.config.reference_for(&file_name),
                file_name,
                path,
            });
        }

        Err(IngestError::io(
            &self.config.content_root,
            std::io::Error::new(ErrorKind::AlreadyExists, "no free file name"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use tempfile::TempDir;

    use super::*;

    fn ingestor(dir: &TempDir) -> ImageIngestor {
        let config = IngestConfig::with_content_root(dir.path().join("uploads"));
        match ImageIngestor::new(config) {
            Ok(ingestor) => ingestor,
            Err(err) => panic!("invalid test config: {err}"),
        }
    }

    #[tokio::test]
    async fn stores_files_byte_for_byte() {
        let dir = TempDir::new().unwrap();
        let ingestor = ingestor(&dir);
        let files = vec![
            UploadedFile::new("a.png", vec![1u8, 2, 3]),
            UploadedFile::new("b.jpg", vec![4u8, 5]),
            UploadedFile::new("c", vec![6u8]),
        ];

        let refs = ingestor.store(files.clone()).await.unwrap();

        assert_eq!(refs.len(), 3);
        for (image, file) in refs.iter().zip(&files) {
            let on_disk = std::fs::read(&image.path).unwrap();
            assert_eq!(on_disk, file.bytes.as_ref());
            assert_eq!(image.url, format!("/uploads/{}", image.file_name));
            assert!(image.file_name.starts_with("img"));
            assert!(image.file_name.ends_with(&file.extension()));
        }
    }

    #[tokio::test]
    async fn same_millisecond_uploads_get_distinct_names() {
        let dir = TempDir::new().unwrap();
        let ingestor = ingestor(&dir);
        let files: Vec<_> = (0..10u8)
            .map(|i| UploadedFile::new("same.png", vec![i]))
            .collect();

        let refs = ingestor.store(files).await.unwrap();

        let names: HashSet<_> = refs.iter().map(|r| r.file_name.clone()).collect();
        assert_eq!(names.len(), 10);
        for (i, image) in refs.iter().enumerate() {
            assert_eq!(std::fs::read(&image.path).unwrap(), vec![i as u8]);
        }
    }

    #[tokio::test]
    async fn rejects_empty_upload() {
        let dir = TempDir::new().unwrap();
        let result = ingestor(&dir).store(Vec::new()).await;
        assert!(matches!(result, Err(IngestError::NoFiles)));
    }

    #[tokio::test]
    async fn rejects_more_than_max_files() {
        let dir = TempDir::new().unwrap();
        let files: Vec<_> = (0..11)
            .map(|_| UploadedFile::new("x.png", vec![0u8]))
            .collect();

        let result = ingestor(&dir).store(files).await;

        assert!(matches!(
            result,
            Err(IngestError::TooManyFiles { max: 10, got: 11 })
        ));
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn creates_content_root_on_first_use() {
        let dir = TempDir::new().unwrap();
        let ingestor = ingestor(&dir);
        assert!(!dir.path().join("uploads").exists());

        ingestor
            .store(vec![UploadedFile::new("a.png", vec![1u8])])
            .await
            .unwrap();

        assert!(dir.path().join("uploads").is_dir());
    }

    #[tokio::test]
    async fn remove_deletes_files_and_tolerates_missing_ones() {
        let dir = TempDir::new().unwrap();
        let ingestor = ingestor(&dir);
        let refs = ingestor
            .store(vec![
                UploadedFile::new("a.png", vec![1u8]),
                UploadedFile::new("b.png", vec![2u8]),
            ])
            .await
            .unwrap();
        std::fs::remove_file(&refs[0].path).unwrap();

        ingestor.remove(&refs).await;

        assert!(!refs[0].path.exists());
        assert!(!refs[1].path.exists());
    }

    #[tokio::test]
    async fn write_failure_surfaces_io_error() {
        let dir = TempDir::new().unwrap();
        // A regular file where the content root should be.
        let blocker = dir.path().join("uploads");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let result = ingestor(&dir)
            .store(vec![UploadedFile::new("a.png", vec![1u8])])
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(!err.is_client_error());
    }
}
