//! Stored document shapes.
//!
//! Field names on the wire (and in the database) are the camelCase names the
//! annotation front end already speaks: `imageUrl`, `imgUrls`,
//! `boundingBoxes`. The user's hash lives under `password`.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    /// PHC-encoded Argon2id hash, or a bcrypt hash for older accounts.
    /// Never the plaintext.
    #[serde(rename = "password")]
    pub password_hash: String,
}

/// Reference to an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// A stored set of caller-defined shapes annotating one or more images.
///
/// `imgUrls` also accepts the singular `imageUrl`, and either key may carry a
/// single string instead of an array; both are normalised to a list.
/// Reading is lenient: a missing or `null` field becomes an empty list, so
/// documents written by older clients still list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxEntry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "imgUrls",
        alias = "imageUrl",
        alias = "imageUrls",
        default,
        deserialize_with = "one_or_many_or_none"
    )]
    pub image_urls: Vec<String>,
    /// Stored verbatim, order preserved.
    #[serde(rename = "boundingBoxes", default, deserialize_with = "null_as_empty")]
    pub bounding_boxes: Vec<Value>,
}

/// Body of a save request. Unlike [`BoundingBoxEntry`], both fields are
/// required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewBoundingBoxEntry {
    #[serde(
        rename = "imgUrls",
        alias = "imageUrl",
        alias = "imageUrls",
        deserialize_with = "one_or_many"
    )]
    pub image_urls: Vec<String>,
    #[serde(rename = "boundingBoxes")]
    pub bounding_boxes: Vec<Value>,
}

impl BoundingBoxEntry {
    pub fn new(image_urls: Vec<String>, bounding_boxes: Vec<Value>) -> Self {
        Self {
            id: None,
            image_urls,
            bounding_boxes,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(url) => vec![url],
        OneOrMany::Many(urls) => urls,
    })
}

fn one_or_many_or_none<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(url)) => vec![url],
        Some(OneOrMany::Many(urls)) => urls,
        None => Vec::new(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_hash_is_stored_under_password() {
        let user = User {
            id: None,
            email: "a@x.io".into(),
            password_hash: "$argon2id$v=19$...".into(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            json!({"email": "a@x.io", "password": "$argon2id$v=19$..."})
        );
    }

    #[test]
    fn entry_accepts_plural_and_singular_keys() {
        let plural: BoundingBoxEntry = serde_json::from_value(json!({
            "imgUrls": ["/uploads/a.png", "/uploads/b.png"],
            "boundingBoxes": []
        }))
        .unwrap();
        assert_eq!(plural.image_urls.len(), 2);

        let singular: BoundingBoxEntry = serde_json::from_value(json!({
            "imageUrl": "/uploads/a.png",
            "boundingBoxes": [{"x": 1}]
        }))
        .unwrap();
        assert_eq!(singular.image_urls, vec!["/uploads/a.png".to_string()]);
        assert_eq!(singular.bounding_boxes, vec![json!({"x": 1})]);
    }

    #[test]
    fn new_entry_requires_both_fields() {
        let missing_boxes = serde_json::from_value::<NewBoundingBoxEntry>(json!({
            "imgUrls": ["/uploads/a.png"]
        }));
        assert!(missing_boxes.is_err());

        let missing_urls = serde_json::from_value::<NewBoundingBoxEntry>(json!({
            "boundingBoxes": []
        }));
        assert!(missing_urls.is_err());

        let single: NewBoundingBoxEntry = serde_json::from_value(json!({
            "imageUrl": "/uploads/a.png",
            "boundingBoxes": []
        }))
        .unwrap();
        assert_eq!(single.image_urls, vec!["/uploads/a.png".to_string()]);
    }

    #[test]
    fn stored_entry_tolerates_missing_and_null_fields() {
        let no_urls: BoundingBoxEntry =
            serde_json::from_value(json!({"_id": "abc", "boundingBoxes": [{"x": 2}]})).unwrap();
        assert!(no_urls.image_urls.is_empty());
        assert_eq!(no_urls.bounding_boxes, vec![json!({"x": 2})]);

        let nulls: BoundingBoxEntry =
            serde_json::from_value(json!({"imgUrls": null, "boundingBoxes": null})).unwrap();
        assert!(nulls.image_urls.is_empty());
        assert!(nulls.bounding_boxes.is_empty());
    }

    #[test]
    fn entry_serializes_with_canonical_keys() {
        let entry = BoundingBoxEntry::new(vec!["/uploads/a.png".into()], vec![json!([1, 2])]);
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"imgUrls": ["/uploads/a.png"], "boundingBoxes": [[1, 2]]})
        );
    }
}
