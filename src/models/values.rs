// ============================================================================
// VALUE TYPES SHARED BY THE ENTITIES
// ============================================================================
//
//   - ImageRef / ImageSet : uploaded photos ({url, key} pairs stored as JSON)
//   - ImagesPayload       : the shapes an images field may arrive in
//   - Labels              : list columns (states, cache types, sizes, ...)
//   - vocabularies        : allowed cache types, sizes and states
//
// ImageSet is always a plain list once it exists. Older rows and some
// clients send a JSON-encoded string or a single object instead; both are
// normalised through ImagesPayload before anything else sees them.
//
// ============================================================================

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of images a submission keeps.
pub const MAX_SUBMISSION_IMAGES: usize = 3;

pub const CACHE_TYPES: [&str; 6] = ["TRADITIONAL", "MULTI", "MYSTERY", "LETTERBOX", "WHERIGO", "VIRTUAL"];
pub const CACHE_SIZES: [&str; 6] = ["NANO", "MICRO", "SMALL", "REGULAR", "LARGE", "OTHER"];
pub const AU_STATES: [&str; 8] = ["ACT", "NSW", "NT", "QLD", "SA", "TAS", "VIC", "WA"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub key: String,
}

/// The accepted encodings of an images field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImagesPayload {
    List(Vec<ImageRef>),
    Single(ImageRef),
    Encoded(String),
}

impl ImagesPayload {
    pub fn normalize(self) -> ImageSet {
        match self {
            Self::List(images) => ImageSet(images),
            Self::Single(image) => ImageSet(vec![image]),
            // Unparsable strings count as "no images".
            Self::Encoded(raw) => serde_json::from_str::<Vec<ImageRef>>(&raw)
                .map(ImageSet)
                .unwrap_or_default(),
        }
    }
}

/// Canonical image list as persisted in the `images` JSON columns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(from = "Value", into = "Vec<ImageRef>")]
pub struct ImageSet(pub Vec<ImageRef>);

impl ImageSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.iter().map(|image| image.key.clone()).collect()
    }

    /// `self` followed by `extra`, keeping at most `cap` entries.
    pub fn merged(&self, extra: &ImageSet, cap: usize) -> ImageSet {
        ImageSet(self.0.iter().chain(extra.0.iter()).take(cap).cloned().collect())
    }
}

impl From<Value> for ImageSet {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ImageSet::default(),
            other => serde_json::from_value::<ImagesPayload>(other)
                .map(ImagesPayload::normalize)
                .unwrap_or_default(),
        }
    }
}

impl From<ImageSet> for Vec<ImageRef> {
    fn from(set: ImageSet) -> Self {
        set.0
    }
}

impl From<Vec<ImageRef>> for ImageSet {
    fn from(images: Vec<ImageRef>) -> Self {
        ImageSet(images)
    }
}

/// A list of short labels stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Labels(pub Vec<String>);

impl Labels {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|label| label == value)
    }

    pub fn joined(&self) -> String {
        self.0.join("; ")
    }
}

impl From<Vec<String>> for Labels {
    fn from(values: Vec<String>) -> Self {
        Labels(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn image(n: u8) -> ImageRef {
        ImageRef {
            url: format!("https://utfs.io/f/{n}"),
            key: format!("key-{n}"),
        }
    }

    #[test]
    fn list_single_and_encoded_shapes_normalize_to_the_same_list() {
        let list = ImageSet::from(json!([{ "url": "https://utfs.io/f/1", "key": "key-1" }]));
        let single = ImageSet::from(json!({ "url": "https://utfs.io/f/1", "key": "key-1" }));
        let encoded = ImageSet::from(json!("[{\"url\":\"https://utfs.io/f/1\",\"key\":\"key-1\"}]"));

        assert_eq!(list, ImageSet(vec![image(1)]));
        assert_eq!(single, list);
        assert_eq!(encoded, list);
    }

    #[test]
    fn garbage_normalizes_to_empty() {
        assert!(ImageSet::from(json!("not json")).is_empty());
        assert!(ImageSet::from(json!(42)).is_empty());
        assert!(ImageSet::from(Value::Null).is_empty());
    }

    #[test]
    fn serializes_as_plain_list() {
        let set = ImageSet(vec![image(1)]);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!([{ "url": "https://utfs.io/f/1", "key": "key-1" }])
        );
    }

    #[test]
    fn merge_keeps_existing_first_and_caps() {
        let existing = ImageSet(vec![image(1), image(2)]);
        let incoming = ImageSet(vec![image(3), image(4)]);

        let merged = existing.merged(&incoming, MAX_SUBMISSION_IMAGES);

        assert_eq!(merged, ImageSet(vec![image(1), image(2), image(3)]));
    }

    #[test]
    fn payload_from_request_body_accepts_every_shape() {
        let single: ImagesPayload = serde_json::from_value(json!({ "url": "u", "key": "k" })).unwrap();
        let encoded: ImagesPayload = serde_json::from_value(json!("[]")).unwrap();

        assert_eq!(single.normalize().keys(), vec!["k".to_string()]);
        assert!(encoded.normalize().is_empty());
    }
}
