//! Workspace umbrella crate for the image annotator.
//!
//! This crate stitches image ingestion and the document stores together so
//! the HTTP layer can run an upload as a single call, and re-exports the
//! types callers need from both.

pub use ingest::{ConfigError, ImageIngestor, ImageRef, IngestConfig, IngestError, UploadedFile};
pub use store::{
    AnnotationStore, AuthOutcome, BackendConfig, BoundingBoxEntry, CredentialStore,
    NewBoundingBoxEntry,
    DocumentBackend, ImageRecord, ImageStore, InMemoryBackend, StoreError, Stores, User,
};

use std::time::Instant;

use thiserror::Error;

/// Errors that can occur while running an upload through ingestion and
/// registration.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("ingest failure: {0}")]
    Ingest(#[from] IngestError),
    #[error("registration failure: {0}")]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// True when the client sent something we refuse to store (no files,
    /// too many files). Everything else is an internal fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, WorkflowError::Ingest(err) if err.is_client_error())
    }
}

/// Store uploaded files and register their reference paths.
///
/// Either every file is written and registered, or none stays on disk: if
/// writing fails the ingestor removes what it wrote, and if registration
/// fails the freshly written files are removed here. Documents already
/// inserted by a partially failed bulk insert are not removed.
pub async fn upload_images(
    ingestor: &ImageIngestor,
    images: &ImageStore,
    files: Vec<UploadedFile>,
) -> Result<Vec<ImageRef>, WorkflowError> {
    let start = Instant::now();
    let stored = ingestor.store(files).await?;

    let urls: Vec<&str> = stored.iter().map(|image| image.url.as_str()).collect();
    if let Err(err) = images.register(&urls).await {
        tracing::warn!(
            error = %err,
            files = stored.len(),
            "registration failed, removing stored files"
        );
        ingestor.remove(&stored).await;
        return Err(err.into());
    }

    tracing::info!(
        count = stored.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "upload_success"
    );
    Ok(stored)
}
