use serde::{Deserialize, Serialize};

use super::{Collection, Field, Timestamps};

/// One instance of a Collection's shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: u64,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub collection_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Collection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_values: Vec<ContentValue>,
}

impl Content {
    pub fn new(collection_id: u64) -> Self {
        Self {
            collection_id,
            ..Self::default()
        }
    }
}

/// A single stored value of one field for one content. Every field type is
/// stored as text; typing is reconstructed at projection time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentValue {
    pub id: u64,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub content_id: u64,
    pub field_id: u64,
    /// 1-based position; always 1 for scalar fields.
    pub sort_index: u32,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
}

impl ContentValue {
    pub fn new(content_id: u64, field_id: u64, sort_index: u32, value: impl Into<String>) -> Self {
        Self {
            content_id,
            field_id,
            sort_index,
            value: value.into(),
            ..Self::default()
        }
    }
}
