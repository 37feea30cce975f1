use serde::Deserialize;

use crate::{
    error::{require_non_empty, StoreResult},
    model::Collection,
    storage::{CollectionRepo, CrudRepository, Page, SqliteStorage},
};

/// Submitted collection attributes.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CollectionData {
    pub name: String,
    pub alias: String,
    #[serde(default)]
    pub description: String,
}

impl CollectionData {
    fn validate(&self) -> StoreResult<()> {
        require_non_empty("name", &self.name)?;
        require_non_empty("alias", &self.alias)
    }
}

#[derive(Clone)]
pub struct CollectionService {
    storage: SqliteStorage,
}

impl CollectionService {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    pub fn create(&self, data: CollectionData) -> StoreResult<Collection> {
        data.validate()?;
        let mut collection =
            Collection::new(data.name, data.alias).with_description(data.description);
        self.storage
            .with_conn(|conn| CollectionRepo::new(conn).create(&mut collection))?;
        log::info!("📝 Created collection {} ({})", collection.alias, collection.id);
        Ok(collection)
    }

    pub fn update_by_id(&self, id: u64, data: CollectionData) -> StoreResult<Collection> {
        self.storage.with_conn(|conn| {
            let repo = CollectionRepo::new(conn);
            let mut collection = repo.find_by_id(id, &[])?;
            data.validate()?;
            collection.name = data.name;
            collection.alias = data.alias;
            collection.description = data.description;
            repo.save(&mut collection)?;
            Ok(collection)
        })
    }

    /// Deletes the collection together with its fields, contents and values.
    pub fn delete_by_id(&self, id: u64) -> StoreResult<()> {
        self.storage.with_conn(|conn| {
            let repo = CollectionRepo::new(conn);
            let collection = repo.find_by_id(id, &[])?;
            repo.delete(&collection)
        })?;
        log::info!("🗑️ Deleted collection {}", id);
        Ok(())
    }

    pub fn find_by_id(&self, id: u64) -> StoreResult<Collection> {
        self.storage
            .with_conn(|conn| CollectionRepo::new(conn).find_by_id(id, &[]))
    }

    pub fn find_by_alias(&self, alias: &str) -> StoreResult<Collection> {
        self.storage
            .with_conn(|conn| CollectionRepo::new(conn).find_by_alias(alias))
    }

    pub fn list(&self, page: Page) -> StoreResult<(Vec<Collection>, u64)> {
        self.storage
            .with_conn(|conn| CollectionRepo::new(conn).list(page, &[]))
    }
}
