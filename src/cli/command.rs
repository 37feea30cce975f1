use clap::Subcommand;

use crate::cli::{AssetCmd, CollectionCmd, ContentCmd, FieldCmd};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(
        about = "Collection management commands",
        long_about = "Create, list and delete collections. Deleting a collection removes its fields, contents and values."
    )]
    Collection {
        #[command(subcommand)]
        cmd: CollectionCmd,
    },
    #[command(
        about = "Field management commands",
        long_about = "Add typed fields to a collection, list them and offer select options."
    )]
    Field {
        #[command(subcommand)]
        cmd: FieldCmd,
    },
    #[command(about = "Asset metadata commands")]
    Asset {
        #[command(subcommand)]
        cmd: AssetCmd,
    },
    #[command(
        about = "Content commands",
        long_about = "Create, edit, inspect, delete and filter content. Values are passed as repeated ALIAS=VALUE pairs; repeating an alias fills a list field in order."
    )]
    Content {
        #[command(subcommand)]
        cmd: ContentCmd,
    },
}
