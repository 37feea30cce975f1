use serde::{Deserialize, Serialize};

use super::Timestamps;

/// An uploaded file. Only the metadata the projection needs lives here;
/// the bytes themselves are handled outside this crate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: u64,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub name: String,
    pub path: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Self::default()
        }
    }
}
