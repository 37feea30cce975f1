use crate::{
    error::{require_non_empty, StoreResult},
    model::Content,
    projection::{ContentItem, Projector},
    storage::{
        AssetRepo, CollectionRepo, ContentRepo, CrudRepository, Page, Preload, QueryOption,
        SqliteStorage,
    },
};

/// Read side of the delivery API: every result is a projected
/// [`ContentItem`].
#[derive(Clone)]
pub struct ApiService {
    storage: SqliteStorage,
}

impl ApiService {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    /// One page of the collection aliased `alias` and its total size.
    pub fn find_content_by_collection_alias(
        &self,
        alias: &str,
        page: Page,
    ) -> StoreResult<(Vec<ContentItem>, u64)> {
        require_non_empty("alias", alias)?;
        self.storage.with_conn(|conn| {
            let collection = CollectionRepo::new(conn).find_by_alias(alias)?;
            let (contents, total) = ContentRepo::new(conn).list(
                page,
                &[
                    QueryOption::id_eq("collection_id", collection.id),
                    QueryOption::preload(Preload::ContentValues),
                    QueryOption::preload(Preload::Collection),
                ],
            )?;
            let assets = AssetRepo::new(conn);
            let items = Projector::new(conn, &assets).prepare_contents(&contents)?;
            Ok((items, total))
        })
    }

    pub fn find_content_by_id(&self, id: u64) -> StoreResult<ContentItem> {
        self.storage.with_conn(|conn| {
            let content = ContentRepo::new(conn).find_by_id(id, &[])?;
            let assets = AssetRepo::new(conn);
            Projector::new(conn, &assets).prepare_content(&content)
        })
    }

    /// Contents of the collection whose field `field_alias` holds exactly
    /// `value`, and how many match in total.
    pub fn find_content_by_collection_and_field_value(
        &self,
        alias: &str,
        field_alias: &str,
        value: &str,
        page: Page,
    ) -> StoreResult<(Vec<ContentItem>, u64)> {
        require_non_empty("alias", alias)?;
        require_non_empty("field", field_alias)?;
        require_non_empty("value", value)?;
        self.storage.with_conn(|conn| {
            let collection = CollectionRepo::new(conn).find_by_alias(alias)?;
            let (contents, total) = ContentRepo::new(conn).find_by_collection_and_field_value(
                collection.id,
                field_alias,
                value,
                page.offset(),
                page.page_size,
            )?;
            let assets = AssetRepo::new(conn);
            let items = Projector::new(conn, &assets).prepare_contents(&contents)?;
            Ok((items, total))
        })
    }

    pub fn prepare_content(&self, content: &Content) -> StoreResult<ContentItem> {
        self.storage.with_conn(|conn| {
            let assets = AssetRepo::new(conn);
            Projector::new(conn, &assets).prepare_content(content)
        })
    }
}
