use clap::Subcommand;

use crate::error::parse_id;

#[derive(Subcommand, Debug, Clone)]
pub enum ContentCmd {
    #[command(about = "Create a content from ALIAS=VALUE pairs")]
    Create {
        #[arg(long = "collection-id", value_name = "ID", value_parser = parse_id)]
        collection_id: u64,
        #[arg(long = "value", value_name = "ALIAS=VALUE")]
        values: Vec<String>,
    },
    #[command(about = "Replace every value of a content")]
    Edit {
        #[arg(long = "collection-id", value_name = "ID", value_parser = parse_id)]
        collection_id: u64,
        #[arg(long = "content-id", value_name = "ID", value_parser = parse_id)]
        content_id: u64,
        #[arg(long = "value", value_name = "ALIAS=VALUE")]
        values: Vec<String>,
    },
    #[command(about = "Print a content as the API returns it")]
    Get {
        #[arg(long, value_name = "ID", value_parser = parse_id)]
        id: u64,
    },
    #[command(about = "Delete a content")]
    Delete {
        #[arg(long = "collection-id", value_name = "ID", value_parser = parse_id)]
        collection_id: u64,
        #[arg(long = "content-id", value_name = "ID", value_parser = parse_id)]
        content_id: u64,
    },
    #[command(about = "Find contents whose field holds exactly VALUE")]
    Filter {
        #[arg(long, help = "Collection alias")]
        collection: String,
        #[arg(long, help = "Field alias")]
        field: String,
        #[arg(long)]
        value: String,
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AssetCmd {
    #[command(about = "Register an uploaded file")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, help = "Public path of the file")]
        path: String,
    },
}
