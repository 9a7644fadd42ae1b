use std::sync::Arc;

use tracing::info;

use crate::backend::{from_document, to_document, DocumentBackend};
use crate::models::ImageRecord;
use crate::StoreError;

/// Image references in the `images` collection.
///
/// References are stored relative (`/uploads/img….png`) and rewritten to
/// absolute URLs with `base_url` when listed.
#[derive(Clone)]
pub struct ImageStore {
    backend: Arc<dyn DocumentBackend>,
    base_url: String,
}

impl ImageStore {
    pub const COLLECTION: &'static str = "images";

    pub fn new(backend: Arc<dyn DocumentBackend>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { backend, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Persist one record per reference in a single bulk insert.
    pub async fn register<S: AsRef<str>>(&self, urls: &[S]) -> Result<(), StoreError> {
        let documents = urls
            .iter()
            .map(|url| {
                to_document(&ImageRecord {
                    image_url: url.as_ref().to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ids = self.backend.insert_many(Self::COLLECTION, documents).await?;
        info!(count = ids.len(), "image references registered");
        Ok(())
    }

    /// Every stored record, in storage order, with absolute URLs.
    pub async fn list_all(&self) -> Result<Vec<ImageRecord>, StoreError> {
        self.backend
            .find_all(Self::COLLECTION)
            .await?
            .into_iter()
            .map(|document| {
                let record: ImageRecord = from_document(document)?;
                Ok(ImageRecord {
                    image_url: self.absolute_url(&record.image_url),
                })
            })
            .collect()
    }

    pub fn absolute_url(&self, relative: &str) -> String {
        format!("{}{}", self.base_url, relative)
    }
}
