use rusqlite::{
    types::{Type, Value},
    Row,
};

use super::{
    base::{self, read_id, read_timestamps, Repo},
    options::QueryOption,
    traits::{CrudRepository, Entity},
};
use crate::{
    error::StoreResult,
    model::{FieldOption, FieldOptionType, Timestamps},
};

pub type FieldOptionRepo<'c> = Repo<'c, FieldOption>;

impl Entity for FieldOption {
    const TABLE: &'static str = "field_options";
    const NAME: &'static str = "field option";
    const COLUMNS: &'static [&'static str] = &["field_id", "option_type", "value"];

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.field_id as i64),
            Value::Text(self.option_type.as_str().to_string()),
            Value::Text(self.value.clone()),
        ]
    }

    fn from_row_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        let option_type: String = row.get(at + 4)?;
        let option_type = option_type.parse::<FieldOptionType>().map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(at + 4, Type::Text, err.into())
        })?;
        Ok(FieldOption {
            id: read_id(row, at)?,
            timestamps: read_timestamps(row, at)?,
            field_id: read_id(row, at + 3)?,
            option_type,
            value: row.get(at + 5)?,
        })
    }
}

impl Repo<'_, FieldOption> {
    pub fn find_by_field_id(&self, field_id: u64) -> StoreResult<Vec<FieldOption>> {
        base::find_all(self.conn(), &[QueryOption::id_eq("field_id", field_id)])
    }
}
