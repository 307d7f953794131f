//! Collection metadata (spec §4.7): `{size, indexes: [{field, type}, ...]}`,
//! JSON-encoded the way the spec describes it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl IndexDescriptor {
    pub fn ordered(field: impl Into<String>) -> IndexDescriptor {
        IndexDescriptor {
            field: field.into(),
            kind: "ordered".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CollectionMeta {
    pub size: u64,
    pub indexes: Vec<IndexDescriptor>,
}

impl CollectionMeta {
    pub fn has_index(&self, field: &str) -> bool {
        self.indexes.iter().any(|d| d.field == field)
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("CollectionMeta serializes")
    }

    pub fn decode(bytes: &[u8]) -> Result<CollectionMeta, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
