use rusqlite::{
    types::{Type, Value},
    Connection, Row,
};

use super::{
    base::{
        group_by, query_in_chunks, read_id, read_timestamps, select_columns, unique_ids, Repo,
    },
    options::{id_value, Preload},
    traits::{CrudRepository, Entity},
};
use crate::{
    error::StoreResult,
    model::{ContentValue, Field, Timestamps},
};

pub type ContentValueRepo<'c> = Repo<'c, ContentValue>;

impl Entity for ContentValue {
    const TABLE: &'static str = "content_values";
    const NAME: &'static str = "content value";
    const COLUMNS: &'static [&'static str] = &["content_id", "field_id", "sort_index", "value"];

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
            Value::Integer(self.content_id as i64),
            Value::Integer(self.field_id as i64),
            Value::Integer(self.sort_index as i64),
            Value::Text(self.value.clone()),
        ]
    }

    fn from_row_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        let sort_index: i64 = row.get(at + 5)?;
        let sort_index = u32::try_from(sort_index).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(at + 5, Type::Integer, Box::new(err))
        })?;
        Ok(ContentValue {
            id: read_id(row, at)?,
            timestamps: read_timestamps(row, at)?,
            content_id: read_id(row, at + 3)?,
            field_id: read_id(row, at + 4)?,
            sort_index,
            value: row.get(at + 6)?,
            field: None,
        })
    }

    fn preload(conn: &Connection, items: &mut [Self], relation: Preload) -> StoreResult<()> {
        if relation != Preload::Field {
            return Ok(());
        }
        let ids = unique_ids(items, |cv| cv.field_id);
        let sql = format!(
            "SELECT {} FROM fields WHERE fields.id IN ({{ids}})",
            select_columns::<Field>()
        );
        let fields = query_in_chunks(conn, &sql, &ids, |row| Field::from_row_at(row, 0))?;
        let by_id = group_by(fields, |f| f.id);
        for cv in items.iter_mut() {
            cv.field = by_id.get(&cv.field_id).and_then(|f| f.first().cloned());
        }
        Ok(())
    }
}

/// Loads the values of every content in `content_ids`, each with its field
/// attached, ordered by content, field and sort position. With
/// `display_only` only values of display fields are returned.
pub(crate) fn load_with_fields(
    conn: &Connection,
    content_ids: &[u64],
    display_only: bool,
) -> StoreResult<Vec<ContentValue>> {
    let display_clause = if display_only {
        "AND fields.display_field = 1"
    } else {
        ""
    };
    let sql = format!(
        r#"
        SELECT {}, {}
        FROM content_values
        JOIN fields ON fields.id = content_values.field_id
        WHERE content_values.content_id IN ({{ids}}) {}
        ORDER BY content_values.content_id, content_values.field_id,
                 content_values.sort_index, content_values.id
        "#,
        select_columns::<ContentValue>(),
        select_columns::<Field>(),
        display_clause
    );
    query_in_chunks(conn, &sql, content_ids, |row| {
        let mut cv = ContentValue::from_row_at(row, 0)?;
        cv.field = Some(Field::from_row_at(row, ContentValue::width())?);
        Ok(cv)
    })
}

impl Repo<'_, ContentValue> {
    pub fn find_by_content_id(&self, content_id: u64) -> StoreResult<Vec<ContentValue>> {
        load_with_fields(self.conn(), &[content_id], false)
    }

    /// Removes every value of one content; returns how many were removed.
    pub fn delete_by_content_id(&self, content_id: u64) -> StoreResult<usize> {
        let rows = self.conn().execute(
            "DELETE FROM content_values WHERE content_id = ?",
            [id_value(content_id)],
        )?;
        Ok(rows)
    }
}

/// Groups freshly loaded values by the content they belong to.
pub(crate) fn attach_values<C>(
    items: &mut [C],
    values: Vec<ContentValue>,
    id: impl Fn(&C) -> u64,
    slot: impl Fn(&mut C) -> &mut Vec<ContentValue>,
) {
    let grouped = group_by(values, |cv| cv.content_id);
    for item in items.iter_mut() {
        let key = id(item);
        *slot(item) = grouped.get(&key).cloned().unwrap_or_default();
    }
}

