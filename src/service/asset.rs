use crate::{
    error::{require_non_empty, StoreResult},
    model::Asset,
    storage::{AssetRepo, CrudRepository, Page, SqliteStorage},
};

/// Page used when offering every asset to a reference picker.
pub const ALL_ASSETS: Page = Page {
    page: 1,
    page_size: 100_000,
};

/// Asset metadata only; storing the uploaded bytes is up to the caller.
#[derive(Clone)]
pub struct AssetService {
    storage: SqliteStorage,
}

impl AssetService {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    pub fn create(&self, name: &str, path: &str) -> StoreResult<Asset> {
        require_non_empty("name", name)?;
        require_non_empty("path", path)?;
        let mut asset = Asset::new(name, path);
        self.storage
            .with_conn(|conn| AssetRepo::new(conn).create(&mut asset))?;
        Ok(asset)
    }

    pub fn find_by_id(&self, id: u64) -> StoreResult<Asset> {
        self.storage
            .with_conn(|conn| CrudRepository::find_by_id(&AssetRepo::new(conn), id, &[]))
    }

    pub fn list(&self, page: Page) -> StoreResult<(Vec<Asset>, u64)> {
        self.storage
            .with_conn(|conn| AssetRepo::new(conn).list(page, &[]))
    }
}
