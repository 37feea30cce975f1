use std::sync::Arc;

use crate::{
    configuration::Configuration,
    events::{EventBus, LogSubscriber},
    service::ServiceSet,
    storage,
};
use anyhow::{Context, Result};

pub fn init_data_dir(config: &Configuration) -> Result<()> {
    let data_dir = std::path::PathBuf::from(&config.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    Ok(())
}

pub fn init_storage(config: &Configuration) -> Result<storage::SqliteStorage> {
    let sqlite = storage::SqliteStorage::new(config.db_path());
    if config.reset {
        sqlite.reset_all().context("resetting storage")?;
    }
    sqlite.init().context("initializing storage")?;
    Ok(sqlite)
}

pub fn build_events() -> EventBus {
    let mut bus = EventBus::new();
    bus.subscribe(Arc::new(LogSubscriber));
    bus
}

pub fn build_services(storage: storage::SqliteStorage, events: EventBus) -> ServiceSet {
    ServiceSet::new(storage, Arc::new(events))
}
