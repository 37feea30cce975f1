mod form;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    error::{parse_id, StoreResult},
    model::{Asset, Collection, Content, ContentValue, Field, FieldType},
    storage::{CrudRepository, Preload, QueryOption, Repo},
};

pub use form::{
    content_to_field_content, contents_to_content_group, ContentForm, ContentGroup, FieldContent,
    FormCandidates,
};

/// Lookup of uploaded assets by id, used to resolve `Asset` typed values.
pub trait AssetStore {
    fn find_by_id(&self, id: u64) -> StoreResult<Asset>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub id: u64,
    pub name: String,
    pub alias: String,
}

impl From<&Collection> for CollectionSummary {
    fn from(c: &Collection) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            alias: c.alias.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssetSummary {
    pub id: u64,
    pub name: String,
    pub path: String,
}

impl From<Asset> for AssetSummary {
    fn from(a: Asset) -> Self {
        Self {
            id: a.id,
            name: a.name,
            path: a.path,
        }
    }
}

/// One stored value as exposed by the API. `value` is always the raw
/// stored text; references additionally carry the resolved target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueUnit {
    pub id: u64,
    pub value: String,
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(ValueUnit),
    List(Vec<ValueUnit>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub collection: CollectionSummary,
    pub values: IndexMap<String, FieldValue>,
}

/// Turns stored contents into API items, resolving asset and content
/// references one lookup at a time.
pub struct Projector<'a> {
    conn: &'a Connection,
    assets: &'a dyn AssetStore,
}

impl<'a> Projector<'a> {
    pub fn new(conn: &'a Connection, assets: &'a dyn AssetStore) -> Self {
        Self { conn, assets }
    }

    /// Projects one content. Values must have their field attached (as the
    /// content repository does); values without one are skipped.
    pub fn prepare_content(&self, content: &Content) -> StoreResult<ContentItem> {
        let collection = match &content.collection {
            Some(c) => CollectionSummary::from(c),
            None => {
                let c = Repo::<Collection>::new(self.conn).find_by_id(content.collection_id, &[])?;
                CollectionSummary::from(&c)
            }
        };

        let mut values = IndexMap::new();
        for cv in &content.content_values {
            let Some(field) = &cv.field else {
                log::debug!(
                    "content value {} of content {} has no field loaded, skipping",
                    cv.id,
                    content.id
                );
                continue;
            };
            aggregate(&mut values, field, self.resolve(cv, field));
        }

        Ok(ContentItem {
            id: content.id,
            created_at: content.timestamps.created_at,
            updated_at: content.timestamps.updated_at,
            collection,
            values,
        })
    }

    pub fn prepare_contents(&self, contents: &[Content]) -> StoreResult<Vec<ContentItem>> {
        contents.iter().map(|c| self.prepare_content(c)).collect()
    }

    /// Builds the API unit for one value. Reference lookups that fail leave
    /// the nested object empty instead of failing the projection.
    pub fn resolve(&self, cv: &ContentValue, field: &Field) -> ValueUnit {
        let mut unit = ValueUnit {
            id: cv.id,
            value: cv.value.clone(),
            field_type: field.field_type,
            asset: None,
            collection: None,
        };

        match field.field_type {
            FieldType::Asset => {
                match parse_id(&cv.value).and_then(|id| self.assets.find_by_id(id)) {
                    Ok(asset) => unit.asset = Some(asset.into()),
                    Err(e) => log::debug!(
                        "asset reference {:?} in field {} not resolved: {}",
                        cv.value,
                        field.alias,
                        e
                    ),
                }
            }
            FieldType::Collection => match self.referenced_collection(&cv.value) {
                Ok(summary) => unit.collection = summary,
                Err(e) => log::debug!(
                    "content reference {:?} in field {} not resolved: {}",
                    cv.value,
                    field.alias,
                    e
                ),
            },
            _ => {}
        }

        unit
    }

    fn referenced_collection(&self, raw: &str) -> StoreResult<Option<CollectionSummary>> {
        let id = parse_id(raw)?;
        let target = Repo::<Content>::new(self.conn)
            .find_by_id(id, &[QueryOption::preload(Preload::Collection)])?;
        Ok(target.collection.as_ref().map(CollectionSummary::from))
    }
}

/// Files `unit` under the field's alias: appended for list fields, assigned
/// (last one wins) otherwise.
fn aggregate(values: &mut IndexMap<String, FieldValue>, field: &Field, unit: ValueUnit) {
    if !field.is_list {
        values.insert(field.alias.clone(), FieldValue::Single(unit));
        return;
    }
    match values.get_mut(&field.alias) {
        Some(FieldValue::List(units)) => units.push(unit),
        _ => {
            values.insert(field.alias.clone(), FieldValue::List(vec![unit]));
        }
    }
}
