use anyhow::{bail, Context as _, Result};
use serde_json::json;

use super::{print_json, CommandRunner};
use crate::{
    cli, context,
    service::FormData,
    storage::{Page, API_PAGE_SIZE},
};

/// Turns repeated `ALIAS=VALUE` arguments into form data. Values keep their
/// order per alias; everything after the first `=` is the value.
pub fn parse_assignments(pairs: &[String]) -> Result<FormData> {
    let mut data = FormData::new();
    for pair in pairs {
        let Some((alias, value)) = pair.split_once('=') else {
            bail!("expected ALIAS=VALUE, got {:?}", pair);
        };
        if alias.is_empty() {
            bail!("empty field alias in {:?}", pair);
        }
        data.entry(alias.to_string())
            .or_default()
            .push(value.to_string());
    }
    Ok(data)
}

impl CommandRunner for cli::ContentCmd {
    fn run(&self, ctx: &context::Context) -> Result<()> {
        let services = &ctx.services;
        match self {
            cli::ContentCmd::Create {
                collection_id,
                values,
            } => {
                let data = parse_assignments(values)?;
                let content = services
                    .content
                    .create_with_values(*collection_id, &data)
                    .context("creating content")?;
                print_json(&services.api.prepare_content(&content)?)
            }
            cli::ContentCmd::Edit {
                collection_id,
                content_id,
                values,
            } => {
                let data = parse_assignments(values)?;
                let content = services
                    .content
                    .edit_with_values(*collection_id, *content_id, &data)
                    .with_context(|| format!("editing content {content_id}"))?;
                print_json(&services.api.prepare_content(&content)?)
            }
            cli::ContentCmd::Get { id } => {
                let item = services
                    .api
                    .find_content_by_id(*id)
                    .with_context(|| format!("loading content {id}"))?;
                print_json(&item)
            }
            cli::ContentCmd::Delete {
                collection_id,
                content_id,
            } => {
                services
                    .content
                    .delete_by_id(*collection_id, *content_id)
                    .with_context(|| format!("deleting content {content_id}"))?;
                log::info!("✅ Content {} deleted", content_id);
                Ok(())
            }
            cli::ContentCmd::Filter {
                collection,
                field,
                value,
                page,
            } => {
                let page = Page::new(*page, API_PAGE_SIZE);
                let (items, total) = services
                    .api
                    .find_content_by_collection_and_field_value(collection, field, value, page)
                    .context("filtering content")?;
                print_json(&json!({
                    "items": items,
                    "total": total,
                    "totalPages": page.total_pages(total),
                }))
            }
        }
    }
}

impl CommandRunner for cli::AssetCmd {
    fn run(&self, ctx: &context::Context) -> Result<()> {
        match self {
            cli::AssetCmd::Create { name, path } => {
                let asset = ctx
                    .services
                    .asset
                    .create(name, path)
                    .context("creating asset")?;
                print_json(&asset)
            }
        }
    }
}
