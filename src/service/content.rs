use std::{collections::HashMap, sync::Arc};

use rusqlite::Connection;
use serde_json::json;

use super::asset::ALL_ASSETS;
use crate::{
    error::{StoreError, StoreResult},
    events::{ContentEvent, EventDispatcher},
    model::{Content, ContentValue, Field},
    projection::{contents_to_content_group, ContentForm, ContentGroup, FormCandidates},
    storage::{
        AssetRepo, CollectionRepo, ContentRepo, ContentValueRepo, CrudRepository, FieldRepo, Page,
        SqliteStorage,
    },
};

/// Decoded form submission: field alias to the submitted values, in
/// submission order.
pub type FormData = HashMap<String, Vec<String>>;

#[derive(Clone)]
pub struct ContentService {
    storage: SqliteStorage,
    events: Arc<dyn EventDispatcher>,
}

impl ContentService {
    pub fn new(storage: SqliteStorage, events: Arc<dyn EventDispatcher>) -> Self {
        Self { storage, events }
    }

    /// Creates a content of `collection_id` with one value set per field of
    /// the collection. All rows are written in one transaction.
    pub fn create_with_values(&self, collection_id: u64, data: &FormData) -> StoreResult<Content> {
        let content = self.storage.transaction(|conn| {
            CollectionRepo::new(conn).find_by_id(collection_id, &[])?;
            let fields = FieldRepo::new(conn).find_by_collection_id(collection_id)?;

            let mut content = Content::new(collection_id);
            ContentRepo::new(conn).create(&mut content)?;
            insert_values(conn, content.id, &fields, data)?;

            ContentRepo::new(conn).find_by_id(content.id, &[])
        })?;

        log::info!(
            "📝 Created content {} in collection {}",
            content.id,
            collection_id
        );
        self.emit(ContentEvent::ContentCreated, &content);
        Ok(content)
    }

    /// Replaces every stored value of the content with the submitted set.
    pub fn edit_with_values(
        &self,
        collection_id: u64,
        content_id: u64,
        data: &FormData,
    ) -> StoreResult<Content> {
        let content = self.storage.transaction(|conn| {
            let repo = ContentRepo::new(conn);
            let mut content = repo.find_by_id(content_id, &[])?;
            ensure_collection(&content, collection_id)?;

            let removed = ContentValueRepo::new(conn).delete_by_content_id(content.id)?;
            log::debug!("removed {} values of content {}", removed, content.id);

            let fields = FieldRepo::new(conn).find_by_collection_id(collection_id)?;
            insert_values(conn, content.id, &fields, data)?;
            repo.save(&mut content)?;

            repo.find_by_id(content.id, &[])
        })?;

        log::info!("📝 Updated content {}", content.id);
        self.emit(ContentEvent::ContentUpdated, &content);
        Ok(content)
    }

    /// Deletes the content and its values, provided it belongs to
    /// `collection_id`.
    pub fn delete_by_id(&self, collection_id: u64, content_id: u64) -> StoreResult<()> {
        let content = self.storage.transaction(|conn| {
            let repo = ContentRepo::new(conn);
            let content = repo.find_by_id(content_id, &[])?;
            ensure_collection(&content, collection_id)?;
            ContentValueRepo::new(conn).delete_by_content_id(content.id)?;
            repo.delete_by_id(content.id)?;
            Ok(content)
        })?;

        log::info!("🗑️ Deleted content {}", content.id);
        self.emit(ContentEvent::ContentDeleted, &content);
        Ok(())
    }

    pub fn find_by_id(&self, id: u64) -> StoreResult<Content> {
        self.storage
            .with_conn(|conn| ContentRepo::new(conn).find_by_id(id, &[]))
    }

    pub fn find_by_collection_id(&self, collection_id: u64) -> StoreResult<Vec<Content>> {
        self.storage
            .with_conn(|conn| ContentRepo::new(conn).find_by_collection_id(collection_id, 0, 0))
    }

    pub fn find_display_value_by_collection_id(
        &self,
        collection_id: u64,
        page: Page,
    ) -> StoreResult<(Vec<Content>, u64)> {
        self.storage.with_conn(|conn| {
            ContentRepo::new(conn).find_display_value_by_collection_id(collection_id, page)
        })
    }

    pub fn find_contents_with_display_content_value(&self) -> StoreResult<Vec<Content>> {
        self.storage
            .with_conn(|conn| ContentRepo::new(conn).list_with_display_content_value())
    }

    /// Contents of the collection aliased `alias`; a zero `limit` is unbounded.
    pub fn list_by_collection_alias(
        &self,
        alias: &str,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Content>> {
        self.storage.with_conn(|conn| {
            let collection = CollectionRepo::new(conn).find_by_alias(alias)?;
            ContentRepo::new(conn).find_by_collection_id(collection.id, offset, limit)
        })
    }

    /// One page of a collection's list view, values grouped by field alias.
    pub fn list_groups(
        &self,
        collection_id: u64,
        page: Page,
    ) -> StoreResult<(Vec<ContentGroup>, u64)> {
        let (contents, total) = self.find_display_value_by_collection_id(collection_id, page)?;
        Ok((contents_to_content_group(contents), total))
    }

    /// Empty form for a new content of `collection_id`.
    pub fn create_form(&self, collection_id: u64) -> StoreResult<ContentForm> {
        self.storage.with_conn(|conn| {
            let collection = CollectionRepo::new(conn).find_by_id(collection_id, &[])?;
            let candidates = load_candidates(conn)?;
            Ok(ContentForm::create(collection, candidates))
        })
    }

    /// Form for editing `content_id`, prefilled with its stored values.
    pub fn edit_form(&self, collection_id: u64, content_id: u64) -> StoreResult<ContentForm> {
        self.storage.with_conn(|conn| {
            let content = ContentRepo::new(conn).find_by_id(content_id, &[])?;
            ensure_collection(&content, collection_id)?;
            let collection = CollectionRepo::new(conn).find_by_id(collection_id, &[])?;
            let candidates = load_candidates(conn)?;
            Ok(ContentForm::edit(&content, collection, candidates))
        })
    }

    fn emit(&self, event: ContentEvent, content: &Content) {
        self.events.dispatch(
            event,
            json!({
                "contentId": content.id,
                "collectionId": content.collection_id,
            }),
        );
    }
}

fn ensure_collection(content: &Content, collection_id: u64) -> StoreResult<()> {
    if content.collection_id != collection_id {
        return Err(StoreError::Mismatch {
            content_id: content.id,
            expected: collection_id,
            actual: content.collection_id,
        });
    }
    Ok(())
}

/// Writes the value rows of one content. List fields get one row per
/// submitted value (1-based `sort_index` in submission order, none when
/// nothing was submitted); other fields get exactly one row holding the
/// first submitted value or an empty string.
fn insert_values(
    conn: &Connection,
    content_id: u64,
    fields: &[Field],
    data: &FormData,
) -> StoreResult<()> {
    let repo = ContentValueRepo::new(conn);
    for field in fields {
        let submitted = data.get(&field.alias).map(Vec::as_slice).unwrap_or_default();
        if field.is_list {
            for (i, value) in submitted.iter().enumerate() {
                let sort_index = u32::try_from(i + 1)
                    .map_err(|_| StoreError::validation("too many values for one field"))?;
                repo.create(&mut ContentValue::new(
                    content_id,
                    field.id,
                    sort_index,
                    value.as_str(),
                ))?;
            }
        } else {
            let value = submitted.first().map(String::as_str).unwrap_or_default();
            repo.create(&mut ContentValue::new(content_id, field.id, 1, value))?;
        }
    }
    Ok(())
}

fn load_candidates(conn: &Connection) -> StoreResult<FormCandidates> {
    let contents = ContentRepo::new(conn).list_with_display_content_value()?;
    let (assets, _) = AssetRepo::new(conn).list(ALL_ASSETS, &[])?;
    Ok(FormCandidates { contents, assets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::FieldType,
        service::{testing::harness, CollectionData, FieldData},
    };

    fn form(pairs: &[(&str, &[&str])]) -> FormData {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    fn blog(h: &crate::service::testing::Harness) -> u64 {
        let collection = h
            .services
            .collection
            .create(CollectionData {
                name: "Blog".to_string(),
                alias: "blog".to_string(),
                description: String::new(),
            })
            .unwrap();
        for (alias, ty, list, display) in [
            ("title", "Text", false, true),
            ("tags", "Text", true, false),
        ] {
            h.services
                .field
                .create(FieldData {
                    name: alias.to_string(),
                    alias: alias.to_string(),
                    collection_id: collection.id.to_string(),
                    field_type: ty.to_string(),
                    is_list: list,
                    display_field: display,
                    ..FieldData::default()
                })
                .unwrap();
        }
        collection.id
    }

    fn values_of(content: &Content, alias: &str) -> Vec<(u32, String)> {
        content
            .content_values
            .iter()
            .filter(|cv| cv.field.as_ref().map(|f| f.alias.as_str()) == Some(alias))
            .map(|cv| (cv.sort_index, cv.value.clone()))
            .collect()
    }

    #[test]
    fn create_keeps_list_order_and_fills_scalars() {
        let h = harness();
        let blog = blog(&h);
        let svc = &h.services.content;

        let content = svc
            .create_with_values(blog, &form(&[("tags", &["c", "a", "b"])]))
            .unwrap();
        assert_eq!(values_of(&content, "title"), vec![(1, String::new())]);
        assert_eq!(
            values_of(&content, "tags"),
            vec![
                (1, "c".to_string()),
                (2, "a".to_string()),
                (3, "b".to_string())
            ]
        );
        assert_eq!(h.events.names(), vec![ContentEvent::ContentCreated]);
    }

    #[test]
    fn scalar_field_keeps_first_submitted_value_and_ignores_unknown_aliases() {
        let h = harness();
        let blog = blog(&h);
        let content = h
            .services
            .content
            .create_with_values(
                blog,
                &form(&[("title", &["one", "two"]), ("nope", &["x"])]),
            )
            .unwrap();
        assert_eq!(values_of(&content, "title"), vec![(1, "one".to_string())]);
        assert_eq!(content.content_values.len(), 1);
    }

    #[test]
    fn create_in_unknown_collection_is_not_found() {
        let h = harness();
        let err = h
            .services
            .content
            .create_with_values(42, &FormData::new())
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(h.events.names().is_empty());
    }

    #[test]
    fn edit_replaces_all_values() {
        let h = harness();
        let blog = blog(&h);
        let svc = &h.services.content;
        let content = svc
            .create_with_values(blog, &form(&[("title", &["old"]), ("tags", &["x", "y"])]))
            .unwrap();

        let edited = svc
            .edit_with_values(blog, content.id, &form(&[("title", &["new"]), ("tags", &["z"])]))
            .unwrap();
        assert_eq!(values_of(&edited, "title"), vec![(1, "new".to_string())]);
        assert_eq!(values_of(&edited, "tags"), vec![(1, "z".to_string())]);
        assert_eq!(edited.timestamps.created_at, content.timestamps.created_at);
        assert_eq!(
            h.events.names(),
            vec![ContentEvent::ContentCreated, ContentEvent::ContentUpdated]
        );
    }

    #[test]
    fn edit_and_delete_guard_the_collection() {
        let h = harness();
        let blog = blog(&h);
        let other = h
            .services
            .collection
            .create(CollectionData {
                name: "Other".to_string(),
                alias: "other".to_string(),
                description: String::new(),
            })
            .unwrap();
        let svc = &h.services.content;
        let content = svc
            .create_with_values(blog, &form(&[("title", &["keep"])]))
            .unwrap();

        let err = svc
            .edit_with_values(other.id, content.id, &form(&[("title", &["lost"])]))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Mismatch { expected, actual, .. } if expected == other.id && actual == blog
        ));
        let err = svc.delete_by_id(other.id, content.id).unwrap_err();
        assert!(matches!(err, StoreError::Mismatch { .. }));

        let reloaded = svc.find_by_id(content.id).unwrap();
        assert_eq!(values_of(&reloaded, "title"), vec![(1, "keep".to_string())]);
        assert_eq!(h.events.names(), vec![ContentEvent::ContentCreated]);
    }

    #[test]
    fn delete_removes_content_and_values() {
        let h = harness();
        let blog = blog(&h);
        let svc = &h.services.content;
        let content = svc
            .create_with_values(blog, &form(&[("tags", &["a"])]))
            .unwrap();

        svc.delete_by_id(blog, content.id).unwrap();
        assert!(svc.find_by_id(content.id).unwrap_err().is_not_found());
        let remaining = h
            .storage
            .with_conn(|conn| ContentValueRepo::new(conn).find_by_content_id(content.id))
            .unwrap();
        assert!(remaining.is_empty());
        assert_eq!(h.events.names().last(), Some(&ContentEvent::ContentDeleted));
    }

    #[test]
    fn listings_and_forms() {
        let h = harness();
        let blog = blog(&h);
        let svc = &h.services.content;
        for title in ["a", "b", "c"] {
            svc.create_with_values(blog, &form(&[("title", &[title]), ("tags", &["t"])]))
                .unwrap();
        }

        assert_eq!(svc.find_by_collection_id(blog).unwrap().len(), 3);
        assert_eq!(svc.list_by_collection_alias("blog", 1, 1).unwrap().len(), 1);
        assert!(svc
            .list_by_collection_alias("nope", 0, 0)
            .unwrap_err()
            .is_not_found());

        let (groups, total) = svc.list_groups(blog, Page::new(2, 2)).unwrap();
        assert_eq!(total, 3);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].values_by_field["title"][0].value, "c");
        assert!(!groups[0].values_by_field.contains_key("tags"));

        let create = svc.create_form(blog).unwrap();
        assert_eq!(create.fields.len(), 2);
        assert_eq!(create.candidates.contents.len(), 3);

        let first = svc.find_by_collection_id(blog).unwrap().remove(0);
        let edit = svc.edit_form(blog, first.id).unwrap();
        assert_eq!(edit.content_id, Some(first.id));
        assert_eq!(edit.fields["title"].values[0].value, "a");
        assert_eq!(edit.fields["tags"].values.len(), 1);
    }

    #[test]
    fn field_types_are_not_validated_on_write() {
        let h = harness();
        let blog = blog(&h);
        h.services
            .field
            .create(FieldData {
                name: "Views".to_string(),
                alias: "views".to_string(),
                collection_id: blog.to_string(),
                field_type: FieldType::Number.to_string(),
                ..FieldData::default()
            })
            .unwrap();
        let content = h
            .services
            .content
            .create_with_values(blog, &form(&[("views", &["lots"])]))
            .unwrap();
        assert_eq!(values_of(&content, "views"), vec![(1, "lots".to_string())]);
    }
}
