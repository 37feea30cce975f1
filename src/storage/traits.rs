use rusqlite::{types::Value, Connection, Row};

use super::{
    base,
    options::{Page, Preload, QueryOption},
};
use crate::{error::StoreResult, model::Timestamps};

/// A row type persisted in its own table.
///
/// Every table has `id`, `created_at` and `updated_at` columns ahead of the
/// entity-specific `COLUMNS`; `from_row_at` reads them in that order starting
/// at `at`, so the same mapper works for joined selects.
pub trait Entity: Sized {
    const TABLE: &'static str;
    /// Human readable name used in `NotFound` errors.
    const NAME: &'static str;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
    fn timestamps(&self) -> &Timestamps;
    fn timestamps_mut(&mut self) -> &mut Timestamps;

    /// Values bound to `COLUMNS`, in the same order.
    fn values(&self) -> Vec<Value>;

    fn from_row_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Self>;

    /// Eager-loads `relation` into `items`. Relations an entity does not
    /// have are ignored.
    fn preload(_conn: &Connection, _items: &mut [Self], _relation: Preload) -> StoreResult<()> {
        Ok(())
    }

    /// Number of columns `from_row_at` consumes.
    fn width() -> usize {
        3 + Self::COLUMNS.len()
    }
}

/// Uniform create/save/delete/find/list over any [`Entity`].
///
/// Implementors only supply the connection; specialised repositories may
/// also declare relations that `find_by_id` always eager-loads.
pub trait CrudRepository<T: Entity> {
    fn conn(&self) -> &Connection;

    fn eager_loads(&self) -> Vec<QueryOption> {
        Vec::new()
    }

    fn create(&self, entity: &mut T) -> StoreResult<()> {
        base::insert(self.conn(), entity)
    }

    fn save(&self, entity: &mut T) -> StoreResult<()> {
        base::update(self.conn(), entity)
    }

    fn delete(&self, entity: &T) -> StoreResult<()> {
        base::delete::<T>(self.conn(), entity.id())
    }

    fn find_by_id(&self, id: u64, opts: &[QueryOption]) -> StoreResult<T> {
        let mut all = self.eager_loads();
        all.extend_from_slice(opts);
        base::find_by_id(self.conn(), id, &all)
    }

    /// Returns one page of rows and the total number of rows matching `opts`.
    fn list(&self, page: Page, opts: &[QueryOption]) -> StoreResult<(Vec<T>, u64)> {
        base::list(self.conn(), page, opts)
    }
}
