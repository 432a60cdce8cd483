use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Source identifiers, page and chunk indices and the like.
pub type Metadata = BTreeMap<String, Value>;

/// A retrieved unit of text. Owned by the index; the query path only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A document and its distance to the query; lower is more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub document: Document,
    pub distance: f64,
}

/// Keeps the scalar entries of a JSON object. Nested arrays and objects are
/// not part of a document's metadata contract and are dropped.
pub fn scalar_metadata(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter(|(_, v)| !matches!(v, Value::Array(_) | Value::Object(_)))
            .collect(),
        _ => Metadata::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_metadata_drops_nested_values() {
        let meta = scalar_metadata(json!({
            "source": "data/france.pdf",
            "page": 3,
            "tags": ["geo"],
            "extra": {"a": 1},
            "draft": false
        }));

        assert_eq!(meta.len(), 3);
        assert_eq!(meta["source"], json!("data/france.pdf"));
        assert_eq!(meta["page"], json!(3));
        assert_eq!(meta["draft"], json!(false));
    }

    #[test]
    fn scalar_metadata_of_non_object_is_empty() {
        assert!(scalar_metadata(json!("nope")).is_empty());
        assert!(scalar_metadata(Value::Null).is_empty());
    }
}
