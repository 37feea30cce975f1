use rusqlite::{
    types::{Type, Value},
    Connection, Row,
};

use super::{
    base::{self, read_bool, read_id, read_timestamps, Repo},
    options::QueryOption,
    traits::{CrudRepository, Entity},
};
use crate::{
    error::StoreResult,
    model::{Field, FieldType, Timestamps},
};

pub type FieldRepo<'c> = Repo<'c, Field>;

impl Entity for Field {
    const TABLE: &'static str = "fields";
    const NAME: &'static str = "field";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "alias",
        "field_type",
        "collection_id",
        "is_list",
        "is_required",
        "display_field",
    ];

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
            Value::Text(self.name.clone()),
            Value::Text(self.alias.clone()),
            Value::Text(self.field_type.as_str().to_string()),
            Value::Integer(self.collection_id as i64),
            Value::Integer(self.is_list as i64),
            Value::Integer(self.is_required as i64),
            Value::Integer(self.display_field as i64),
        ]
    }

    fn from_row_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        let field_type: String = row.get(at + 5)?;
        let field_type = field_type.parse::<FieldType>().map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(at + 5, Type::Text, Box::new(err))
        })?;
        Ok(Field {
            id: read_id(row, at)?,
            timestamps: read_timestamps(row, at)?,
            name: row.get(at + 3)?,
            alias: row.get(at + 4)?,
            field_type,
            collection_id: read_id(row, at + 6)?,
            is_list: read_bool(row, at + 7)?,
            is_required: read_bool(row, at + 8)?,
            display_field: read_bool(row, at + 9)?,
        })
    }
}

impl Repo<'_, Field> {
    pub fn find_by_collection_id(&self, collection_id: u64) -> StoreResult<Vec<Field>> {
        base::find_all(
            self.conn(),
            &[QueryOption::id_eq("collection_id", collection_id)],
        )
    }

    pub fn find_display_fields_by_collection_id(&self, collection_id: u64) -> StoreResult<Vec<Field>> {
        base::find_all(
            self.conn(),
            &[
                QueryOption::id_eq("collection_id", collection_id),
                QueryOption::eq("display_field", 1i64),
            ],
        )
    }

    pub fn find_by_field_types(&self, field_types: &[FieldType]) -> StoreResult<Vec<Field>> {
        let types = field_types
            .iter()
            .map(|t| Value::Text(t.as_str().to_string()))
            .collect();
        base::find_all(self.conn(), &[QueryOption::In("field_type", types)])
    }
}
