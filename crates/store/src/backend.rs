use crate::StoreError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[cfg(feature = "backend-mongo")]
mod mongo;

#[cfg(feature = "backend-mongo")]
pub use mongo::MongoBackend;

/// A stored document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Field holding the backend-assigned document id.
pub const ID_FIELD: &str = "_id";

/// Trait for a document storage backend.
/// Collections are addressed by name and created implicitly on first insert.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Insert one document and return the id the backend assigned to it.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError>;
    /// Insert several documents in one call. An empty batch is a no-op.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, StoreError>;
    /// First document, in storage order, whose string `field` equals `value`.
    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError>;
    /// Every document of the collection, in storage order.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use store::BackendConfig;
///
/// // In-memory (for testing)
/// let config = BackendConfig::in_memory();
///
/// // MongoDB
/// let config = BackendConfig::mongo("mongodb://localhost:27017", "bounding_box_db");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Use a MongoDB deployment. Requires the `backend-mongo` feature
    /// (enabled by default).
    Mongo {
        #[serde(default = "default_mongo_uri")]
        uri: String,
        #[serde(default = "default_database")]
        database: String,
    },
    /// Keep everything in process memory. Useful for tests and local runs.
    InMemory,
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "bounding_box_db".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Mongo {
            uri: default_mongo_uri(),
            database: default_database(),
        }
    }
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn mongo<U: Into<String>, D: Into<String>>(uri: U, database: D) -> Self {
        BackendConfig::Mongo {
            uri: uri.into(),
            database: database.into(),
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Mongo { .. } => "mongo",
            BackendConfig::InMemory => "in_memory",
        }
    }

    /// Build the backend based on the configuration.
    ///
    /// For MongoDB this parses the connection string and sets up the client;
    /// the driver connects lazily on the first operation.
    pub async fn build(&self) -> Result<Arc<dyn DocumentBackend>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Arc::new(InMemoryBackend::new())),
            BackendConfig::Mongo { uri, database } => {
                #[cfg(feature = "backend-mongo")]
                {
                    Ok(Arc::new(MongoBackend::connect(uri, database).await?))
                }
                #[cfg(not(feature = "backend-mongo"))]
                {
                    let _ = (uri, database);
                    Err(StoreError::backend("mongo backend disabled at compile time"))
                }
            }
        }
    }
}

/// Serialize a model into a storable document. Anything that is not a JSON
/// object is rejected.
pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::serialization(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

pub(crate) fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

/// An in-memory backend using a `RwLock` around a map of collections.
pub struct InMemoryBackend {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn assign_id(document: &mut Document) -> String {
        match document.get(ID_FIELD).and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentBackend for InMemoryBackend {
    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<String, StoreError> {
        let id = Self::assign_id(&mut document);
        self.collections
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        // One lock for the whole batch, so a batch is never interleaved.
        let mut guard = self
            .collections
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let stored = guard.entry(collection.to_string()).or_default();
        let mut ids = Vec::with_capacity(documents.len());
        for mut document in documents {
            ids.push(Self::assign_id(&mut document));
            stored.push(document);
        }
        Ok(ids)
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self
            .collections
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|doc| doc.get(field).and_then(Value::as_str) == Some(value))
                .cloned()
        }))
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let guard = self
            .collections
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(collection).cloned().unwrap_or_default())
    }
}
