use rusqlite::{types::Value, Row};

use super::{
    base::{read_id, read_timestamps, Repo},
    traits::{CrudRepository, Entity},
};
use crate::{
    error::StoreResult,
    model::{Asset, Timestamps},
    projection::AssetStore,
};

pub type AssetRepo<'c> = Repo<'c, Asset>;

impl Entity for Asset {
    const TABLE: &'static str = "assets";
    const NAME: &'static str = "asset";
    const COLUMNS: &'static [&'static str] = &["name", "path"];

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
        vec![Value::Text(self.name.clone()), Value::Text(self.path.clone())]
    }

    fn from_row_at(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
        Ok(Asset {
            id: read_id(row, at)?,
            timestamps: read_timestamps(row, at)?,
            name: row.get(at + 3)?,
            path: row.get(at + 4)?,
        })
    }
}

impl AssetStore for Repo<'_, Asset> {
    fn find_by_id(&self, id: u64) -> StoreResult<Asset> {
        CrudRepository::find_by_id(self, id, &[])
    }
}
