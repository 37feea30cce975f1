use clap::Subcommand;

use crate::error::parse_id;

#[derive(Subcommand, Debug, Clone)]
pub enum CollectionCmd {
    #[command(about = "Create a collection")]
    Create {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Stable handle used by the API")]
        alias: String,
        #[arg(long, default_value = "", help = "Free text description")]
        description: String,
    },
    #[command(about = "List collections page by page")]
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long = "page-size", default_value_t = crate::storage::DEFAULT_PAGE_SIZE)]
        page_size: u64,
    },
    #[command(about = "Delete a collection with everything stored in it")]
    Delete {
        #[arg(long, value_name = "ID", value_parser = parse_id)]
        id: u64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum FieldCmd {
    #[command(about = "Add a field to a collection")]
    Create {
        #[arg(long = "collection-id", value_name = "ID")]
        collection_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, help = "Unique within the collection")]
        alias: String,
        #[arg(
            long = "type",
            value_name = "TYPE",
            help = "One of Text, Number, Boolean, Date, Asset, Collection, Textarea, RichText, MultiSelect"
        )]
        field_type: String,
        #[arg(long, default_value_t = false, help = "Accept any number of values")]
        list: bool,
        #[arg(long, default_value_t = false)]
        required: bool,
        #[arg(long, default_value_t = false, help = "Show in list views")]
        display: bool,
    },
    #[command(about = "List the fields of a collection")]
    List {
        #[arg(long = "collection-id", value_name = "ID", value_parser = parse_id)]
        collection_id: u64,
        #[arg(long = "display-only", default_value_t = false)]
        display_only: bool,
    },
    #[command(about = "Offer a selectable value for a field")]
    AddOption {
        #[arg(long = "field-id", value_name = "ID", value_parser = parse_id)]
        field_id: u64,
        #[arg(long)]
        value: String,
    },
}
