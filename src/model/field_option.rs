use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Timestamps;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldOptionType {
    #[default]
    SelectOption,
}

impl FieldOptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOptionType::SelectOption => "SelectOption",
        }
    }
}

impl fmt::Display for FieldOptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldOptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SelectOption" => Ok(FieldOptionType::SelectOption),
            other => Err(format!("unknown field option type: {other}")),
        }
    }
}

/// A selectable value offered by a `MultiSelect` field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub id: u64,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    pub field_id: u64,
    pub option_type: FieldOptionType,
    pub value: String,
}

impl FieldOption {
    pub fn select(field_id: u64, value: impl Into<String>) -> Self {
        Self {
            field_id,
            option_type: FieldOptionType::SelectOption,
            value: value.into(),
            ..Self::default()
        }
    }
}
