use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Asset, Collection, Content, ContentValue, Field};

/// One field of an edit form with the values currently stored for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldContent {
    pub field: Field,
    pub values: Vec<ContentValue>,
}

/// Everything a reference picker can offer: other contents (display values
/// only) and uploaded assets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FormCandidates {
    pub contents: Vec<Content>,
    pub assets: Vec<Asset>,
}

/// A create or edit form: one entry per field of the collection, in field
/// order, plus the reference candidates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentForm {
    pub collection: Collection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<u64>,
    pub fields: IndexMap<String, FieldContent>,
    pub candidates: FormCandidates,
}

impl ContentForm {
    pub fn create(collection: Collection, candidates: FormCandidates) -> Self {
        let fields = seed(&collection);
        Self {
            collection,
            content_id: None,
            fields,
            candidates,
        }
    }

    pub fn edit(content: &Content, collection: Collection, candidates: FormCandidates) -> Self {
        let fields = content_to_field_content(content, &collection);
        Self {
            collection,
            content_id: Some(content.id),
            fields,
            candidates,
        }
    }
}

fn seed(collection: &Collection) -> IndexMap<String, FieldContent> {
    collection
        .fields
        .iter()
        .map(|field| {
            (
                field.alias.clone(),
                FieldContent {
                    field: field.clone(),
                    values: Vec::new(),
                },
            )
        })
        .collect()
}

/// Seeds an entry for every field of `collection`, even ones without values,
/// then folds the content's values in by field alias. Values whose field is
/// not part of the collection are dropped.
pub fn content_to_field_content(
    content: &Content,
    collection: &Collection,
) -> IndexMap<String, FieldContent> {
    let mut fields = seed(collection);
    for cv in &content.content_values {
        let Some(alias) = cv.field.as_ref().map(|f| f.alias.as_str()) else {
            continue;
        };
        if let Some(entry) = fields.get_mut(alias) {
            entry.values.push(cv.clone());
        }
    }
    fields
}

/// A content in a list view with its values grouped by field alias.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentGroup {
    pub content: Content,
    pub values_by_field: IndexMap<String, Vec<ContentValue>>,
}

pub fn contents_to_content_group(contents: Vec<Content>) -> Vec<ContentGroup> {
    contents
        .into_iter()
        .map(|content| {
            let mut values_by_field: IndexMap<String, Vec<ContentValue>> = IndexMap::new();
            for cv in &content.content_values {
                if let Some(field) = &cv.field {
                    values_by_field
                        .entry(field.alias.clone())
                        .or_default()
                        .push(cv.clone());
                }
            }
            ContentGroup {
                content,
                values_by_field,
            }
        })
        .collect()
}
