//! MongoDB backend.
//!
//! Documents cross the boundary as JSON objects. On the way in they are
//! converted to BSON with `bson::to_document`; on the way out they are
//! rendered as relaxed extended JSON, except for `_id`, which is flattened to
//! the ObjectId's hex string so callers never see `{"$oid": ...}`.
//!
//! # Configuration Example
//! ```yaml
//! storage:
//!   kind: mongo
//!   uri: "mongodb://localhost:27017"
//!   database: "bounding_box_db"
//! ```

use super::{Document, DocumentBackend, ID_FIELD};
use crate::StoreError;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document as BsonDocument};
use mongodb::{Client, Collection, Database};
use serde_json::Value;

/// MongoDB-backed document storage.
///
/// The driver's `Client` pools connections internally and is cheap to clone,
/// so one backend is shared by every request.
pub struct MongoBackend {
    db: Database,
}

impl MongoBackend {
    /// Parse `uri` and bind to `database`.
    ///
    /// # Example
    /// ```no_run
    /// use store::MongoBackend;
    ///
    /// # async fn run() -> Result<(), store::StoreError> {
    /// let backend = MongoBackend::connect("mongodb://localhost:27017", "bounding_box_db").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(StoreError::backend)?;
        tracing::info!(database, "mongo client configured");
        Ok(Self {
            db: client.database(database),
        })
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.db.collection::<BsonDocument>(name)
    }
}

fn to_bson(document: &Document) -> Result<BsonDocument, StoreError> {
    bson::to_document(document).map_err(StoreError::serialization)
}

fn id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}

fn to_json(mut document: BsonDocument) -> Result<Document, StoreError> {
    let id = document.remove(ID_FIELD);
    let mut json = match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::serialization(format!(
                "expected a document, got {other}"
            )))
        }
    };
    if let Some(id) = id {
        json.insert(ID_FIELD.to_string(), Value::String(id_to_string(id)));
    }
    Ok(json)
}

#[async_trait]
impl DocumentBackend for MongoBackend {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let result = self
            .collection(collection)
            .insert_one(to_bson(&document)?, None)
            .await
            .map_err(StoreError::backend)?;
        Ok(id_to_string(result.inserted_id))
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, StoreError> {
        // The driver rejects an empty insert_many.
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let batch = documents
            .iter()
            .map(to_bson)
            .collect::<Result<Vec<_>, _>>()?;
        let result = self
            .collection(collection)
            .insert_many(batch, None)
            .await
            .map_err(StoreError::backend)?;

        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        Ok(ids.into_iter().map(|(_, id)| id_to_string(id)).collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError> {
        let mut filter = BsonDocument::new();
        filter.insert(field, value);
        self.collection(collection)
            .find_one(filter, None)
            .await
            .map_err(StoreError::backend)?
            .map(to_json)
            .transpose()
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(collection)
            .find(None, None)
            .await
            .map_err(StoreError::backend)?;
        let documents: Vec<BsonDocument> =
            cursor.try_collect().await.map_err(StoreError::backend)?;
        documents.into_iter().map(to_json).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn object_id_is_flattened_to_hex() {
        let oid = ObjectId::new();
        let document = doc! {
            "_id": oid,
            "imgUrls": ["/uploads/img1.png"],
            "boundingBoxes": [{ "x": 1, "y": 2.5, "label": "cat" }],
        };

        let json = to_json(document).unwrap();

        assert_eq!(json[ID_FIELD], json!(oid.to_hex()));
        assert_eq!(json["imgUrls"], json!(["/uploads/img1.png"]));
        assert_eq!(json["boundingBoxes"][0]["label"], json!("cat"));
        assert_eq!(json["boundingBoxes"][0]["x"], json!(1));
        assert_eq!(json["boundingBoxes"][0]["y"], json!(2.5));
    }

    #[test]
    fn json_documents_convert_to_bson() {
        let document = match json!({"email": "a@x.io", "password": "$argon2id$..."}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let bson = to_bson(&document).unwrap();
        assert_eq!(bson.get_str("email").unwrap(), "a@x.io");
    }
}
