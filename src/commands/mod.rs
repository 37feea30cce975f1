use serde::Serialize;

use crate::cli::Command;
use crate::context;

pub mod content;
pub mod schema;

pub trait CommandRunner {
    fn run(&self, ctx: &context::Context) -> anyhow::Result<()>;
}

impl Command {
    pub fn run(&self, ctx: &context::Context) -> anyhow::Result<()> {
        match self {
            Command::Collection { cmd } => cmd.run(ctx),
            Command::Field { cmd } => cmd.run(ctx),
            Command::Asset { cmd } => cmd.run(ctx),
            Command::Content { cmd } => cmd.run(ctx),
        }
    }
}

/// Command results go to stdout as pretty JSON; logs stay on stderr.
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
