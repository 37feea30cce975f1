use serde::{Deserialize, Serialize};

use super::{Field, Timestamps};

/// A user-defined content type. `alias` is the stable handle used by the API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: u64,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub name: String,
    pub alias: String,
    pub description: String,
    /// Populated only when preloaded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Collection {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn field_by_alias(&self, alias: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.alias == alias)
    }
}
