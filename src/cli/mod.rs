mod args;
mod command;
mod content_cmd;
mod schema_cmd;

pub use args::Cli;
pub use command::Command;
pub use content_cmd::{AssetCmd, ContentCmd};
pub use schema_cmd::{CollectionCmd, FieldCmd};

pub use args::parse;
