use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::backend::{from_document, to_document, DocumentBackend};
use crate::models::BoundingBoxEntry;
use crate::StoreError;

/// Bounding-box entries in the `bounding_boxes` collection. Shapes are
/// opaque JSON and stored exactly as received.
#[derive(Clone)]
pub struct AnnotationStore {
    backend: Arc<dyn DocumentBackend>,
}

impl AnnotationStore {
    pub const COLLECTION: &'static str = "bounding_boxes";

    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Store one entry and return its id.
    pub async fn save(
        &self,
        image_urls: Vec<String>,
        bounding_boxes: Vec<Value>,
    ) -> Result<String, StoreError> {
        let entry = BoundingBoxEntry::new(image_urls, bounding_boxes);
        let id = self
            .backend
            .insert_one(Self::COLLECTION, to_document(&entry)?)
            .await?;
        info!(
            entry_id = %id,
            images = entry.image_urls.len(),
            boxes = entry.bounding_boxes.len(),
            "bounding boxes saved"
        );
        Ok(id)
    }

    pub async fn list_all(&self) -> Result<Vec<BoundingBoxEntry>, StoreError> {
        self.backend
            .find_all(Self::COLLECTION)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }
}
