use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Timestamps;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Boolean,
    Date,
    Asset,
    Collection,
    Textarea,
    RichText,
    MultiSelect,
}

impl FieldType {
    pub const ALL: [FieldType; 9] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Asset,
        FieldType::Collection,
        FieldType::Textarea,
        FieldType::RichText,
        FieldType::MultiSelect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::Date => "Date",
            FieldType::Asset => "Asset",
            FieldType::Collection => "Collection",
            FieldType::Textarea => "Textarea",
            FieldType::RichText => "RichText",
            FieldType::MultiSelect => "MultiSelect",
        }
    }

    /// Whether stored values of this type are ids of other rows.
    pub fn is_reference(&self) -> bool {
        matches!(self, FieldType::Asset | FieldType::Collection)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeParseError(pub String);

impl fmt::Display for FieldTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field type: {:?}", self.0)
    }
}

impl std::error::Error for FieldTypeParseError {}

impl FromStr for FieldType {
    type Err = FieldTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FieldTypeParseError(s.to_string()))
    }
}

/// One typed attribute of a Collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: u64,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub name: String,
    /// Unique within the owning collection; used as the projection map key.
    pub alias: String,
    pub field_type: FieldType,
    pub collection_id: u64,
    pub is_list: bool,
    pub is_required: bool,
    pub display_field: bool,
}

impl Field {
    pub fn new(
        collection_id: u64,
        name: impl Into<String>,
        alias: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            collection_id,
            name: name.into(),
            alias: alias.into(),
            field_type,
            ..Self::default()
        }
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn display(mut self) -> Self {
        self.display_field = true;
        self
    }
}
