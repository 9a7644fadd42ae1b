//! Document-backed stores for the annotator.
//!
//! Three stores share one [`DocumentBackend`]:
//!
//! - [`CredentialStore`] (`users`): email and Argon2id password hash.
//! - [`ImageStore`] (`images`): relative reference paths of uploaded files.
//! - [`AnnotationStore`] (`bounding_boxes`): image URLs plus opaque shapes.
//!
//! None of them enforces uniqueness or cross-collection integrity; every
//! operation is a single insert or read.
//!
//! ```
//! use store::{BackendConfig, Stores};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), store::StoreError> {
//! let backend = BackendConfig::in_memory().build().await?;
//! let stores = Stores::new(backend, "http://localhost:5000");
//!
//! stores.images.register(&["/uploads/img1.png"]).await?;
//! let images = stores.images.list_all().await?;
//! assert_eq!(images[0].image_url, "http://localhost:5000/uploads/img1.png");
//! # Ok(())
//! # }
//! ```
use std::sync::Arc;

mod annotations;
mod backend;
mod credentials;
mod error;
mod images;
mod models;

pub use annotations::AnnotationStore;
pub use backend::{BackendConfig, Document, DocumentBackend, InMemoryBackend, ID_FIELD};
#[cfg(feature = "backend-mongo")]
pub use backend::MongoBackend;
pub use credentials::{AuthOutcome, CredentialStore};
pub use error::StoreError;
pub use images::ImageStore;
pub use models::{BoundingBoxEntry, ImageRecord, NewBoundingBoxEntry, User};

/// The three stores over one shared backend.
#[derive(Clone)]
pub struct Stores {
    pub credentials: CredentialStore,
    pub images: ImageStore,
    pub annotations: AnnotationStore,
    backend: Arc<dyn DocumentBackend>,
}

impl Stores {
    pub fn new(backend: Arc<dyn DocumentBackend>, image_base_url: impl Into<String>) -> Self {
        Self {
            credentials: CredentialStore::new(backend.clone()),
            images: ImageStore::new(backend.clone(), image_base_url),
            annotations: AnnotationStore::new(backend.clone()),
            backend,
        }
    }

    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }
}
