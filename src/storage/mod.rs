mod asset;
mod base;
mod collection;
mod content;
mod content_value;
mod field;
mod field_option;
mod options;
pub mod sqlite;
pub mod traits;

pub use asset::AssetRepo;
pub use base::Repo;
pub use collection::CollectionRepo;
pub use content::ContentRepo;
pub use content_value::ContentValueRepo;
pub use field::FieldRepo;
pub use field_option::FieldOptionRepo;
pub use options::{Page, Preload, QueryOption, API_PAGE_SIZE, DEFAULT_PAGE_SIZE};
pub use sqlite::{SqliteStorage, SqliteTx};
pub use traits::{CrudRepository, Entity};
