use rusqlite::{params_from_iter, types::Value, Connection, Row};

use super::{
    base::{self, query_all, query_in_chunks, read_id, read_timestamps, select_columns, unique_ids},
    content_value::{attach_values, load_with_fields},
    options::{id_value, window, Page, Preload, QueryOption},
    traits::{CrudRepository, Entity},
};
use crate::{
    error::{StoreError, StoreResult},
    model::{Collection, Content, Timestamps},
};

impl Entity for Content {
    const TABLE: &'static str = "contents";
    const NAME: &'static str = "content";
    const COLUMNS: &'static [&'static str] = &["collection_id"];

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
        vec![Value::Integer(self.collection_id as i64)]
    }

    fn from_row_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        Ok(Content {
            id: read_id(row, at)?,
            timestamps: read_timestamps(row, at)?,
            collection_id: read_id(row, at + 3)?,
            collection: None,
            content_values: Vec::new(),
        })
    }

    fn preload(conn: &Connection, items: &mut [Self], relation: Preload) -> StoreResult<()> {
        match relation {
            Preload::Collection => {
                let ids = unique_ids(items, |c| c.collection_id);
                let sql = format!(
                    "SELECT {} FROM collections WHERE collections.id IN ({{ids}})",
                    select_columns::<Collection>()
                );
                let collections =
                    query_in_chunks(conn, &sql, &ids, |row| Collection::from_row_at(row, 0))?;
                for content in items.iter_mut() {
                    content.collection = collections
                        .iter()
                        .find(|c| c.id == content.collection_id)
                        .cloned();
                }
            }
            Preload::ContentValues | Preload::DisplayContentValues => {
                let ids = unique_ids(items, |c| c.id);
                let display_only = relation == Preload::DisplayContentValues;
                let values = load_with_fields(conn, &ids, display_only)?;
                attach_values(items, values, |c| c.id, |c| &mut c.content_values);
            }
            Preload::Fields | Preload::Field => {}
        }
        Ok(())
    }
}

/// Content lookups always carry their values and owning collection.
pub struct ContentRepo<'c> {
    conn: &'c Connection,
}

impl CrudRepository<Content> for ContentRepo<'_> {
    fn conn(&self) -> &Connection {
        self.conn
    }

    fn eager_loads(&self) -> Vec<QueryOption> {
        vec![
            QueryOption::preload(Preload::ContentValues),
            QueryOption::preload(Preload::Collection),
        ]
    }
}

const FIELD_VALUE_JOIN: &str = r#"
    FROM contents
    JOIN content_values ON content_values.content_id = contents.id
    JOIN fields ON fields.id = content_values.field_id
    WHERE contents.collection_id = ?
      AND fields.alias = ?
      AND content_values.value = ?
"#;

impl<'c> ContentRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn delete_by_id(&self, id: u64) -> StoreResult<()> {
        base::delete::<Content>(self.conn, id)
    }

    /// Contents of one collection with all values; a zero `limit` is unbounded.
    pub fn find_by_collection_id(
        &self,
        collection_id: u64,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Content>> {
        let sql = format!(
            "SELECT {} FROM contents WHERE contents.collection_id = ? ORDER BY contents.id LIMIT ? OFFSET ?",
            select_columns::<Content>()
        );
        let params = std::iter::once(id_value(collection_id))
            .chain(window(offset, limit))
            .collect::<Vec<_>>();
        let mut contents = query_all::<Content>(self.conn, &sql, params.iter())?;
        base::apply_preloads(
            self.conn,
            &mut contents,
            &[Preload::ContentValues, Preload::Collection],
        )?;
        Ok(contents)
    }

    /// One page of a collection's contents carrying only display values.
    pub fn find_display_value_by_collection_id(
        &self,
        collection_id: u64,
        page: Page,
    ) -> StoreResult<(Vec<Content>, u64)> {
        self.list(
            page,
            &[
                QueryOption::id_eq("collection_id", collection_id),
                QueryOption::preload(Preload::DisplayContentValues),
            ],
        )
    }

    /// Every content of every collection, carrying only display values.
    pub fn list_with_display_content_value(&self) -> StoreResult<Vec<Content>> {
        base::find_all(
            self.conn,
            &[
                QueryOption::preload(Preload::DisplayContentValues),
                QueryOption::preload(Preload::Collection),
            ],
        )
    }

    /// Contents of `collection_id` holding a value exactly equal to `value`
    /// for the field aliased `field_alias`. Returns the page of matches and
    /// the distinct match count.
    pub fn find_by_collection_and_field_value(
        &self,
        collection_id: u64,
        field_alias: &str,
        value: &str,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<Content>, u64)> {
        if field_alias.is_empty() {
            return Err(StoreError::validation("no field alias given"));
        }

        let filter = [
            id_value(collection_id),
            Value::Text(field_alias.to_string()),
            Value::Text(value.to_string()),
        ];

        let count_sql = format!("SELECT COUNT(DISTINCT contents.id) {FIELD_VALUE_JOIN}");
        let total: i64 = self
            .conn
            .query_row(&count_sql, params_from_iter(filter.iter()), |row| row.get(0))?;
        if total <= 0 {
            return Ok((Vec::new(), 0));
        }

        let sql = format!(
            "SELECT DISTINCT {} {FIELD_VALUE_JOIN} ORDER BY contents.id LIMIT ? OFFSET ?",
            select_columns::<Content>()
        );
        let params = filter
            .into_iter()
            .chain(window(offset, limit))
            .collect::<Vec<_>>();
        let mut contents = query_all::<Content>(self.conn, &sql, params.iter())?;
        base::apply_preloads(
            self.conn,
            &mut contents,
            &[Preload::ContentValues, Preload::Collection],
        )?;

        Ok((contents, total as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{ContentValue, Field, FieldType},
        storage::{CollectionRepo, ContentValueRepo, FieldRepo, SqliteStorage},
    };
    use tempfile::TempDir;

    struct Fixture {
        collection: u64,
        title: u64,
        tags: u64,
    }

    fn with_fixture<T>(f: impl FnOnce(&Connection, &Fixture) -> StoreResult<T>) -> T {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("cms.sqlite"));
        storage
            .with_conn(|conn| {
                let mut blog = Collection::new("Blog", "blog");
                CollectionRepo::new(conn).create(&mut blog)?;
                let fields = FieldRepo::new(conn);
                let mut title = Field::new(blog.id, "Title", "title", FieldType::Text).display();
                fields.create(&mut title)?;
                let mut tags = Field::new(blog.id, "Tags", "tags", FieldType::Text).list();
                fields.create(&mut tags)?;
                f(
                    conn,
                    &Fixture {
                        collection: blog.id,
                        title: title.id,
                        tags: tags.id,
                    },
                )
            })
            .unwrap()
    }

    fn insert_content(
        conn: &Connection,
        fx: &Fixture,
        title: &str,
        tags: &[&str],
    ) -> StoreResult<u64> {
        let mut content = Content::new(fx.collection);
        ContentRepo::new(conn).create(&mut content)?;
        let values = ContentValueRepo::new(conn);
        values.create(&mut ContentValue::new(content.id, fx.title, 1, title))?;
        for (i, tag) in tags.iter().enumerate() {
            values.create(&mut ContentValue::new(content.id, fx.tags, i as u32 + 1, *tag))?;
        }
        Ok(content.id)
    }

    #[test]
    fn find_by_id_eager_loads_values_fields_and_collection() {
        with_fixture(|conn, fx| {
            let id = insert_content(conn, fx, "Hello", &["b", "a"])?;
            let content = ContentRepo::new(conn).find_by_id(id, &[])?;

            assert_eq!(content.collection.as_ref().map(|c| c.alias.as_str()), Some("blog"));
            let values: Vec<_> = content
                .content_values
                .iter()
                .map(|cv| (cv.field.as_ref().unwrap().alias.as_str(), cv.value.as_str()))
                .collect();
            assert_eq!(values, vec![("title", "Hello"), ("tags", "b"), ("tags", "a")]);
            Ok(())
        });
    }

    #[test]
    fn missing_content_is_not_found() {
        with_fixture(|conn, _| {
            let err = ContentRepo::new(conn).find_by_id(404, &[]).unwrap_err();
            assert!(matches!(err, StoreError::NotFound { entity: "content", .. }));
            Ok(())
        });
    }

    #[test]
    fn display_values_exclude_non_display_fields() {
        with_fixture(|conn, fx| {
            insert_content(conn, fx, "One", &["x"])?;
            insert_content(conn, fx, "Two", &["y", "z"])?;

            let repo = ContentRepo::new(conn);
            let (contents, total) =
                repo.find_display_value_by_collection_id(fx.collection, Page::new(1, 10))?;
            assert_eq!(total, 2);
            for content in &contents {
                assert_eq!(content.content_values.len(), 1);
                assert_eq!(content.content_values[0].field_id, fx.title);
            }

            let all = repo.list_with_display_content_value()?;
            assert_eq!(all.len(), 2);
            assert!(all.iter().all(|c| c.collection.is_some()));
            Ok(())
        });
    }

    #[test]
    fn find_by_collection_id_honours_offset_and_unbounded_limit() {
        with_fixture(|conn, fx| {
            for i in 0..5 {
                insert_content(conn, fx, &format!("T{i}"), &[])?;
            }
            let repo = ContentRepo::new(conn);
            assert_eq!(repo.find_by_collection_id(fx.collection, 0, 0)?.len(), 5);
            let page = repo.find_by_collection_id(fx.collection, 3, 10)?;
            assert_eq!(page.len(), 2);
            assert_eq!(page[0].content_values[0].value, "T3");
            Ok(())
        });
    }

    #[test]
    fn pages_past_the_end_are_empty() {
        with_fixture(|conn, fx| {
            for i in 0..3 {
                insert_content(conn, fx, &format!("T{i}"), &[])?;
            }
            let repo = ContentRepo::new(conn);
            for raw in ["2", "100000000000000000", "18446744073709551615"] {
                let page = Page::parse(Some(raw), None, 100);
                let (contents, total) = repo.list(page, &[])?;
                assert!(contents.is_empty(), "page {raw}");
                assert_eq!(total, 3);
            }

            let (contents, total) = repo.find_by_collection_and_field_value(
                fx.collection,
                "title",
                "T0",
                u64::MAX,
                100,
            )?;
            assert!(contents.is_empty());
            assert_eq!(total, 1);
            Ok(())
        });
    }

    #[test]
    fn field_value_filter_is_exact_and_case_sensitive() {
        with_fixture(|conn, fx| {
            let go = insert_content(conn, fx, "go", &["go"])?;
            insert_content(conn, fx, "Go", &[])?;
            insert_content(conn, fx, "golang", &[])?;
            insert_content(conn, fx, "rust", &["go"])?;

            let repo = ContentRepo::new(conn);
            let (found, total) =
                repo.find_by_collection_and_field_value(fx.collection, "title", "go", 0, 0)?;
            assert_eq!(total, 1);
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].id, go);
            assert_eq!(found[0].content_values.len(), 2);

            let (tagged, total) =
                repo.find_by_collection_and_field_value(fx.collection, "tags", "go", 0, 0)?;
            assert_eq!(total, 2);
            assert_eq!(tagged.len(), 2);
            Ok(())
        });
    }

    #[test]
    fn field_value_filter_counts_distinct_contents() {
        with_fixture(|conn, fx| {
            insert_content(conn, fx, "t", &["dup", "dup", "dup"])?;
            let (found, total) = ContentRepo::new(conn)
                .find_by_collection_and_field_value(fx.collection, "tags", "dup", 0, 0)?;
            assert_eq!(total, 1);
            assert_eq!(found.len(), 1);
            Ok(())
        });
    }

    #[test]
    fn field_value_filter_returns_empty_not_error() {
        with_fixture(|conn, fx| {
            insert_content(conn, fx, "go", &[])?;
            let repo = ContentRepo::new(conn);
            let (found, total) =
                repo.find_by_collection_and_field_value(fx.collection, "title", "none", 0, 10)?;
            assert!(found.is_empty());
            assert_eq!(total, 0);

            let err = repo
                .find_by_collection_and_field_value(fx.collection, "", "go", 0, 10)
                .unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)));
            Ok(())
        });
    }

    #[test]
    fn deleting_content_cascades_to_values() {
        with_fixture(|conn, fx| {
            let id = insert_content(conn, fx, "bye", &["a", "b"])?;
            let repo = ContentRepo::new(conn);
            repo.delete_by_id(id)?;
            assert!(ContentValueRepo::new(conn).find_by_content_id(id)?.is_empty());
            assert!(repo.delete_by_id(id).unwrap_err().is_not_found());
            Ok(())
        });
    }
}
