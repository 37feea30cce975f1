use std::sync::Arc;

use cmscore::{
    error::StoreError,
    events::NoopDispatcher,
    model::{Collection, Field, FieldType},
    projection::FieldValue,
    service::{CollectionData, FieldData, FormData, ServiceSet},
    storage::{
        CollectionRepo, ContentRepo, ContentValueRepo, CrudRepository, FieldRepo, Page,
        SqliteStorage,
    },
};
use tempfile::TempDir;

struct Cms {
    _dir: TempDir,
    storage: SqliteStorage,
    services: ServiceSet,
}

fn cms() -> Cms {
    let dir = TempDir::new().unwrap();
    let storage = SqliteStorage::new(dir.path().join("cms.sqlite"));
    storage.init().unwrap();
    let services = ServiceSet::new(storage.clone(), Arc::new(NoopDispatcher));
    Cms {
        _dir: dir,
        storage,
        services,
    }
}

fn collection(cms: &Cms, alias: &str) -> u64 {
    cms.services
        .collection
        .create(CollectionData {
            name: alias.to_uppercase(),
            alias: alias.to_string(),
            description: String::new(),
        })
        .unwrap()
        .id
}

fn field(cms: &Cms, collection_id: u64, alias: &str, ty: FieldType, list: bool) -> u64 {
    cms.services
        .field
        .create(FieldData {
            name: alias.to_string(),
            alias: alias.to_string(),
            collection_id: collection_id.to_string(),
            field_type: ty.to_string(),
            is_list: list,
            display_field: alias == "title",
            ..FieldData::default()
        })
        .unwrap()
        .id
}

fn form(pairs: &[(&str, &[&str])]) -> FormData {
    pairs
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}

fn stored(cms: &Cms, content_id: u64) -> Vec<(String, u32, String)> {
    cms.storage
        .with_conn(|conn| ContentValueRepo::new(conn).find_by_content_id(content_id))
        .unwrap()
        .into_iter()
        .map(|cv| (cv.field.unwrap().alias, cv.sort_index, cv.value))
        .collect()
}

fn blog(cms: &Cms) -> u64 {
    let blog = collection(cms, "blog");
    field(cms, blog, "title", FieldType::Text, false);
    field(cms, blog, "tags", FieldType::Text, true);
    blog
}

#[test]
fn list_values_round_trip_in_submitted_order() {
    let cms = cms();
    let blog = blog(&cms);
    let tags = ["zeta", "alpha", "mu", "beta", "omega"];
    let content = cms
        .services
        .content
        .create_with_values(blog, &form(&[("title", &["t"]), ("tags", &tags)]))
        .unwrap();

    let item = cms.services.api.find_content_by_id(content.id).unwrap();
    let FieldValue::List(units) = &item.values["tags"] else {
        panic!("tags should be a list");
    };
    let values: Vec<_> = units.iter().map(|u| u.value.as_str()).collect();
    assert_eq!(values, tags);

    let indexes: Vec<_> = stored(&cms, content.id)
        .into_iter()
        .filter(|(alias, _, _)| alias == "tags")
        .map(|(_, idx, _)| idx)
        .collect();
    assert_eq!(indexes, vec![1, 2, 3, 4, 5]);
}

#[test]
fn edit_leaves_no_stale_values() {
    let cms = cms();
    let blog = blog(&cms);
    let svc = &cms.services.content;
    let content = svc
        .create_with_values(blog, &form(&[("title", &["v1"]), ("tags", &["a", "b", "c"])]))
        .unwrap();

    svc.edit_with_values(blog, content.id, &form(&[("title", &["v2"])]))
        .unwrap();

    assert_eq!(
        stored(&cms, content.id),
        vec![("title".to_string(), 1, "v2".to_string())]
    );
}

#[test]
fn failed_edit_keeps_previous_values() {
    let cms = cms();
    let blog = blog(&cms);
    let svc = &cms.services.content;
    let content = svc
        .create_with_values(blog, &form(&[("title", &["keep"]), ("tags", &["x"])]))
        .unwrap();
    let before = stored(&cms, content.id);

    cms.storage
        .with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_boom BEFORE INSERT ON content_values
                 WHEN NEW.value = 'boom'
                 BEGIN SELECT RAISE(ABORT, 'boom rejected'); END;",
            )?;
            Ok(())
        })
        .unwrap();

    let err = svc
        .edit_with_values(
            blog,
            content.id,
            &form(&[("title", &["changed"]), ("tags", &["ok", "boom"])]),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert_eq!(stored(&cms, content.id), before);

    let err = svc
        .create_with_values(blog, &form(&[("title", &["boom"])]))
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert_eq!(svc.find_by_collection_id(blog).unwrap().len(), 1);
}

#[test]
fn display_fields_are_exactly_the_flagged_ones() {
    let cms = cms();
    let blog = blog(&cms);
    field(&cms, blog, "body", FieldType::RichText, false);

    let display = cms
        .services
        .field
        .find_display_fields_by_collection_id(blog)
        .unwrap();
    assert_eq!(display.len(), 1);
    assert!(display.iter().all(|f| f.display_field));
    assert_eq!(display[0].alias, "title");
}

#[test]
fn asset_references_resolve_or_degrade() {
    let cms = cms();
    let posts = collection(&cms, "posts");
    field(&cms, posts, "cover", FieldType::Asset, false);
    let logo = cms.services.asset.create("logo", "/logo.png").unwrap();

    let logo_id = logo.id.to_string();
    let good = cms
        .services
        .content
        .create_with_values(posts, &form(&[("cover", &[logo_id.as_str()])]))
        .unwrap();
    let bad = cms
        .services
        .content
        .create_with_values(posts, &form(&[("cover", &["424242"])]))
        .unwrap();

    let api = &cms.services.api;
    let FieldValue::Single(unit) = &api.find_content_by_id(good.id).unwrap().values["cover"] else {
        panic!("cover should be scalar");
    };
    let asset = unit.asset.as_ref().unwrap();
    assert_eq!((asset.id, asset.name.as_str()), (logo.id, "logo"));

    let FieldValue::Single(unit) = &api.find_content_by_id(bad.id).unwrap().values["cover"] else {
        panic!("cover should be scalar");
    };
    assert!(unit.asset.is_none());
    assert_eq!(unit.value, "424242");
}

#[test]
fn twenty_three_items_make_three_pages() {
    let cms = cms();
    let blog = blog(&cms);
    for i in 0..23 {
        let title = format!("t{i}");
        cms.services
            .content
            .create_with_values(blog, &form(&[("title", &[title.as_str()])]))
            .unwrap();
    }

    let page = Page::new(3, 10);
    let (contents, total) = cms
        .services
        .content
        .find_display_value_by_collection_id(blog, page)
        .unwrap();
    assert_eq!(total, 23);
    assert_eq!(page.total_pages(total), 3);
    assert_eq!(contents.len(), 3);
}

#[test]
fn mismatched_collection_writes_nothing() {
    let cms = cms();
    let blog = blog(&cms);
    let news = collection(&cms, "news");
    let svc = &cms.services.content;
    let content = svc
        .create_with_values(blog, &form(&[("title", &["mine"])]))
        .unwrap();
    let before = stored(&cms, content.id);

    let err = svc
        .edit_with_values(news, content.id, &form(&[("title", &["theirs"])]))
        .unwrap_err();
    assert!(matches!(err, StoreError::Mismatch { .. }));
    let err = svc.delete_by_id(news, content.id).unwrap_err();
    assert!(matches!(err, StoreError::Mismatch { .. }));

    assert_eq!(stored(&cms, content.id), before);
}

#[test]
fn field_value_filter_is_exact() {
    let cms = cms();
    let blog = blog(&cms);
    let svc = &cms.services.content;
    let mut expected = Vec::new();
    for title in ["go", "Go", "golang", "go ", "go"] {
        let content = svc
            .create_with_values(blog, &form(&[("title", &[title]), ("tags", &["go"])]))
            .unwrap();
        if title == "go" {
            expected.push(content.id);
        }
    }

    let (found, total) = cms
        .storage
        .with_conn(|conn| {
            ContentRepo::new(conn).find_by_collection_and_field_value(blog, "title", "go", 0, 0)
        })
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), expected);
}

#[test]
fn deleting_a_collection_cascades_to_everything_it_owns() {
    let cms = cms();
    let blog = blog(&cms);
    let content = cms
        .services
        .content
        .create_with_values(blog, &form(&[("title", &["bye"]), ("tags", &["a"])]))
        .unwrap();

    cms.services.collection.delete_by_id(blog).unwrap();

    cms.storage
        .with_conn(|conn| {
            assert!(FieldRepo::new(conn).find_by_collection_id(blog)?.is_empty());
            assert!(ContentRepo::new(conn)
                .find_by_id(content.id, &[])
                .unwrap_err()
                .is_not_found());
            assert!(ContentValueRepo::new(conn)
                .find_by_content_id(content.id)?
                .is_empty());
            let orphans: i64 =
                conn.query_row("SELECT COUNT(*) FROM content_values", [], |r| r.get(0))?;
            assert_eq!(orphans, 0);
            Ok(())
        })
        .unwrap();
}

#[test]
fn generic_repository_covers_schema_entities() {
    let cms = cms();
    cms.storage
        .with_conn(|conn| {
            let collections = CollectionRepo::new(conn);
            let mut shop = Collection::new("Shop", "shop");
            collections.create(&mut shop)?;

            let fields = FieldRepo::new(conn);
            let mut price = Field::new(shop.id, "Price", "price", FieldType::Number).required();
            fields.create(&mut price)?;
            price.name = "Unit price".to_string();
            fields.save(&mut price)?;

            let loaded = collections.find_by_alias("shop")?;
            assert_eq!(loaded.fields.len(), 1);
            assert_eq!(loaded.fields[0].name, "Unit price");
            assert!(loaded.fields[0].is_required);

            fields.delete(&price)?;
            assert!(fields.find_by_id(price.id, &[]).unwrap_err().is_not_found());
            Ok(())
        })
        .unwrap();
}
