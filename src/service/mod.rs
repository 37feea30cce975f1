mod api;
mod asset;
mod collection;
mod content;
mod field;

use std::sync::Arc;

use crate::{events::EventDispatcher, storage::SqliteStorage};

pub use api::ApiService;
pub use asset::AssetService;
pub use collection::{CollectionData, CollectionService};
pub use content::{ContentService, FormData};
pub use field::{FieldData, FieldService};

/// Every service sharing one database handle and one event dispatcher.
#[derive(Clone)]
pub struct ServiceSet {
    pub collection: CollectionService,
    pub field: FieldService,
    pub content: ContentService,
    pub asset: AssetService,
    pub api: ApiService,
}

impl ServiceSet {
    pub fn new(storage: SqliteStorage, events: Arc<dyn EventDispatcher>) -> Self {
        Self {
            collection: CollectionService::new(storage.clone()),
            field: FieldService::new(storage.clone()),
            content: ContentService::new(storage.clone(), events),
            asset: AssetService::new(storage.clone()),
            api: ApiService::new(storage),
        }
    }
}
