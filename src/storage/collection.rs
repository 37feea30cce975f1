use rusqlite::{types::Value, Connection, Row};

use super::{
    base::{self, group_by, query_in_chunks, read_id, read_timestamps, select_columns, unique_ids},
    options::{Preload, QueryOption},
    traits::{CrudRepository, Entity},
};
use crate::{
    error::{StoreError, StoreResult},
    model::{Collection, Field, Timestamps},
};

impl Entity for Collection {
    const TABLE: &'static str = "collections";
    const NAME: &'static str = "collection";
    const COLUMNS: &'static [&'static str] = &["name", "alias", "description"];

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
            Value::Text(self.description.clone()),
        ]
    }

    fn from_row_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        Ok(Collection {
            id: read_id(row, at)?,
            timestamps: read_timestamps(row, at)?,
            name: row.get(at + 3)?,
            alias: row.get(at + 4)?,
            description: row.get(at + 5)?,
            fields: Vec::new(),
        })
    }

    fn preload(conn: &Connection, items: &mut [Self], relation: Preload) -> StoreResult<()> {
        if relation != Preload::Fields {
            return Ok(());
        }
        let ids = unique_ids(items, |c| c.id);
        let sql = format!(
            "SELECT {} FROM fields WHERE fields.collection_id IN ({{ids}}) ORDER BY fields.id",
            select_columns::<Field>()
        );
        let fields = query_in_chunks(conn, &sql, &ids, |row| Field::from_row_at(row, 0))?;
        let grouped = group_by(fields, |f| f.collection_id);
        for collection in items.iter_mut() {
            collection.fields = grouped.get(&collection.id).cloned().unwrap_or_default();
        }
        Ok(())
    }
}

/// Collections always come with their fields when looked up directly.
pub struct CollectionRepo<'c> {
    conn: &'c Connection,
}

impl<'c> CollectionRepo<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn find_by_alias(&self, alias: &str) -> StoreResult<Collection> {
        base::find_first(
            self.conn,
            &[
                QueryOption::eq("alias", alias.to_string()),
                QueryOption::preload(Preload::Fields),
            ],
        )?
        .ok_or_else(|| StoreError::not_found(Collection::NAME, alias))
    }
}

impl CrudRepository<Collection> for CollectionRepo<'_> {
    fn conn(&self) -> &Connection {
        self.conn
    }

    fn eager_loads(&self) -> Vec<QueryOption> {
        vec![QueryOption::preload(Preload::Fields)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::FieldType,
        storage::{FieldRepo, Page, SqliteStorage},
    };
    use tempfile::TempDir;

    fn with_db<T>(f: impl FnOnce(&Connection) -> StoreResult<T>) -> T {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::new(dir.path().join("cms.sqlite"));
        storage.with_conn(f).unwrap()
    }

    #[test]
    fn create_assigns_id_and_timestamps() {
        with_db(|conn| {
            let repo = CollectionRepo::new(conn);
            let mut blog = Collection::new("Blog", "blog").with_description("posts");
            repo.create(&mut blog)?;
            assert!(blog.id > 0);
            assert_eq!(blog.timestamps.created_at, blog.timestamps.updated_at);

            let loaded = repo.find_by_id(blog.id, &[])?;
            assert_eq!(loaded.alias, "blog");
            assert_eq!(loaded.description, "posts");
            Ok(())
        });
    }

    #[test]
    fn find_by_id_preloads_fields() {
        with_db(|conn| {
            let repo = CollectionRepo::new(conn);
            let mut blog = Collection::new("Blog", "blog");
            repo.create(&mut blog)?;
            let fields = FieldRepo::new(conn);
            fields.create(&mut Field::new(blog.id, "Title", "title", FieldType::Text))?;
            fields.create(&mut Field::new(blog.id, "Tags", "tags", FieldType::Text).list())?;

            let loaded = repo.find_by_id(blog.id, &[])?;
            let aliases: Vec<_> = loaded.fields.iter().map(|f| f.alias.as_str()).collect();
            assert_eq!(aliases, vec!["title", "tags"]);
            Ok(())
        });
    }

    #[test]
    fn find_by_alias_returns_not_found_for_unknown_alias() {
        with_db(|conn| {
            let repo = CollectionRepo::new(conn);
            repo.create(&mut Collection::new("Blog", "blog"))?;
            assert_eq!(repo.find_by_alias("blog")?.name, "Blog");
            let err = repo.find_by_alias("news").unwrap_err();
            assert!(err.is_not_found());
            Ok(())
        });
    }

    #[test]
    fn save_rewrites_row_and_keeps_created_at() {
        with_db(|conn| {
            let repo = CollectionRepo::new(conn);
            let mut blog = Collection::new("Blog", "blog");
            repo.create(&mut blog)?;
            let created_at = blog.timestamps.created_at;

            blog.name = "Weblog".to_string();
            repo.save(&mut blog)?;

            let loaded = repo.find_by_id(blog.id, &[])?;
            assert_eq!(loaded.name, "Weblog");
            assert_eq!(loaded.timestamps.created_at, created_at);
            assert!(loaded.timestamps.updated_at >= created_at);
            Ok(())
        });
    }

    #[test]
    fn delete_missing_row_is_not_found() {
        with_db(|conn| {
            let repo = CollectionRepo::new(conn);
            let mut ghost = Collection::new("Ghost", "ghost");
            ghost.id = 99;
            assert!(repo.delete(&ghost).unwrap_err().is_not_found());
            assert!(repo.save(&mut ghost).unwrap_err().is_not_found());
            Ok(())
        });
    }

    #[test]
    fn list_counts_before_paging() {
        with_db(|conn| {
            let repo = CollectionRepo::new(conn);
            for i in 0..23 {
                repo.create(&mut Collection::new(format!("C{i}"), format!("c{i}")))?;
            }
            let (items, total) = repo.list(Page::new(3, 10), &[])?;
            assert_eq!(total, 23);
            assert_eq!(items.len(), 3);
            assert_eq!(items[0].alias, "c20");
            assert_eq!(Page::new(3, 10).total_pages(total), 3);

            let (beyond, total) = repo.list(Page::new(4, 10), &[])?;
            assert!(beyond.is_empty());
            assert_eq!(total, 23);
            Ok(())
        });
    }
}
