use serde::Deserialize;

use crate::{
    error::{parse_id, require_non_empty, StoreError, StoreResult},
    model::{Field, FieldOption, FieldType},
    storage::{
        CollectionRepo, ContentValueRepo, CrudRepository, FieldOptionRepo, FieldRepo, Page,
        QueryOption, SqliteStorage,
    },
};

/// Submitted field attributes, as they arrive from a form or the CLI.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FieldData {
    pub name: String,
    pub alias: String,
    pub collection_id: String,
    pub field_type: String,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub display_field: bool,
}

impl FieldData {
    /// Checks the submission and resolves its collection id and type.
    fn parse(&self) -> StoreResult<(u64, FieldType)> {
        let collection_id = parse_id(&self.collection_id)?;
        require_non_empty("name", &self.name)?;
        require_non_empty("alias", &self.alias)?;
        let field_type = self
            .field_type
            .parse::<FieldType>()
            .map_err(|e| StoreError::validation(e.to_string()))?;
        Ok((collection_id, field_type))
    }

    fn apply(self, field: &mut Field, collection_id: u64, field_type: FieldType) {
        field.name = self.name;
        field.alias = self.alias;
        field.collection_id = collection_id;
        field.field_type = field_type;
        field.is_list = self.is_list;
        field.is_required = self.is_required;
        field.display_field = self.display_field;
    }
}

#[derive(Clone)]
pub struct FieldService {
    storage: SqliteStorage,
}

impl FieldService {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    pub fn create(&self, data: FieldData) -> StoreResult<Field> {
        let (collection_id, field_type) = data.parse()?;
        self.storage.with_conn(|conn| {
            CollectionRepo::new(conn).find_by_id(collection_id, &[])?;
            let mut field = Field::default();
            data.apply(&mut field, collection_id, field_type);
            FieldRepo::new(conn).create(&mut field)?;
            log::info!(
                "📝 Created field {} ({}) on collection {}",
                field.alias,
                field.field_type,
                collection_id
            );
            Ok(field)
        })
    }

    /// Rewrites the field's attributes. Moving it to another collection is
    /// refused while any content still holds a value for it.
    pub fn update_by_id(&self, id: u64, data: FieldData) -> StoreResult<Field> {
        let (collection_id, field_type) = data.parse()?;
        self.storage.transaction(|conn| {
            let repo = FieldRepo::new(conn);
            let mut field = repo.find_by_id(id, &[])?;
            if field.collection_id != collection_id {
                CollectionRepo::new(conn).find_by_id(collection_id, &[])?;
                let (_, stored) = ContentValueRepo::new(conn).list(
                    Page::new(1, 1),
                    &[QueryOption::id_eq("field_id", field.id)],
                )?;
                if stored > 0 {
                    return Err(StoreError::validation(format!(
                        "field {} holds {} value(s) in collection {}",
                        field.alias, stored, field.collection_id
                    )));
                }
                log::info!(
                    "🔀 Moving field {} from collection {} to {}",
                    field.alias,
                    field.collection_id,
                    collection_id
                );
            }
            data.apply(&mut field, collection_id, field_type);
            repo.save(&mut field)?;
            Ok(field)
        })
    }

    /// Deletes the field, its options and every value stored for it.
    pub fn delete_by_id(&self, id: u64) -> StoreResult<()> {
        self.storage.with_conn(|conn| {
            let repo = FieldRepo::new(conn);
            let field = repo.find_by_id(id, &[])?;
            repo.delete(&field)
        })
    }

    pub fn find_by_id(&self, id: u64) -> StoreResult<Field> {
        self.storage
            .with_conn(|conn| FieldRepo::new(conn).find_by_id(id, &[]))
    }

    pub fn find_by_collection_id(&self, collection_id: u64) -> StoreResult<Vec<Field>> {
        self.storage
            .with_conn(|conn| FieldRepo::new(conn).find_by_collection_id(collection_id))
    }

    pub fn find_display_fields_by_collection_id(
        &self,
        collection_id: u64,
    ) -> StoreResult<Vec<Field>> {
        self.storage.with_conn(|conn| {
            FieldRepo::new(conn).find_display_fields_by_collection_id(collection_id)
        })
    }

    pub fn list(&self, page: Page) -> StoreResult<(Vec<Field>, u64)> {
        self.storage
            .with_conn(|conn| FieldRepo::new(conn).list(page, &[]))
    }

    /// Offers `value` as a selectable option of the field.
    pub fn add_option(&self, field_id: u64, value: &str) -> StoreResult<FieldOption> {
        require_non_empty("option value", value)?;
        self.storage.with_conn(|conn| {
            FieldRepo::new(conn).find_by_id(field_id, &[])?;
            let mut option = FieldOption::select(field_id, value);
            FieldOptionRepo::new(conn).create(&mut option)?;
            Ok(option)
        })
    }

    pub fn options(&self, field_id: u64) -> StoreResult<Vec<FieldOption>> {
        self.storage
            .with_conn(|conn| FieldOptionRepo::new(conn).find_by_field_id(field_id))
    }
}
