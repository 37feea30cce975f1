mod asset;
mod collection;
mod content;
mod field;
mod field_option;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use asset::Asset;
pub use collection::Collection;
pub use content::{Content, ContentValue};
pub use field::{Field, FieldType, FieldTypeParseError};
pub use field_option::{FieldOption, FieldOptionType};

/// Row bookkeeping shared by every persisted entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}
