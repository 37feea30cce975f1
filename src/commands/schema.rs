use anyhow::{Context as _, Result};
use serde_json::json;

use super::{print_json, CommandRunner};
use crate::{
    cli, context,
    service::{CollectionData, FieldData},
    storage::Page,
};

impl CommandRunner for cli::CollectionCmd {
    fn run(&self, ctx: &context::Context) -> Result<()> {
        let svc = &ctx.services.collection;
        match self {
            cli::CollectionCmd::Create {
                name,
                alias,
                description,
            } => {
                let collection = svc
                    .create(CollectionData {
                        name: name.clone(),
                        alias: alias.clone(),
                        description: description.clone(),
                    })
                    .context("creating collection")?;
                print_json(&collection)
            }
            cli::CollectionCmd::List { page, page_size } => {
                let page = Page::new(*page, *page_size);
                let (collections, total) = svc.list(page).context("listing collections")?;
                print_json(&json!({
                    "collections": collections,
                    "total": total,
                    "totalPages": page.total_pages(total),
                }))
            }
            cli::CollectionCmd::Delete { id } => {
                svc.delete_by_id(*id)
                    .with_context(|| format!("deleting collection {id}"))?;
                log::info!("✅ Collection {} deleted", id);
                Ok(())
            }
        }
    }
}

impl CommandRunner for cli::FieldCmd {
    fn run(&self, ctx: &context::Context) -> Result<()> {
        let svc = &ctx.services.field;
        match self {
            cli::FieldCmd::Create {
                collection_id,
                name,
                alias,
                field_type,
                list,
                required,
                display,
            } => {
                let field = svc
                    .create(FieldData {
                        name: name.clone(),
                        alias: alias.clone(),
                        collection_id: collection_id.clone(),
                        field_type: field_type.clone(),
                        is_list: *list,
                        is_required: *required,
                        display_field: *display,
                    })
                    .context("creating field")?;
                print_json(&field)
            }
            cli::FieldCmd::List {
                collection_id,
                display_only,
            } => {
                let fields = if *display_only {
                    svc.find_display_fields_by_collection_id(*collection_id)
                } else {
                    svc.find_by_collection_id(*collection_id)
                }
                .context("listing fields")?;
                print_json(&fields)
            }
            cli::FieldCmd::AddOption { field_id, value } => {
                let option = svc
                    .add_option(*field_id, value)
                    .context("adding field option")?;
                print_json(&option)
            }
        }
    }
}
